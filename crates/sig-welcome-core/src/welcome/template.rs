//! Welcome comment text.

use crate::config::BotConfig;
use crate::resolve::Owners;

const MENTION_SEPARATOR: &str = " , @";

/// Renders the welcome comment.
///
/// Committers are only mentioned when there are any.
pub fn render_comment(config: &BotConfig, author: &str, sig: &str, owners: &Owners) -> String {
    let mut comment = format!(
        "Hi ***{author}***, welcome to the {community} Community.\n\
         I'm the Bot here serving you. You can find the instructions on how to interact with me at **[Here]({link})**.\n\
         If you have any questions, please contact the SIG: [{sig}]({base}/{sig}), and any of the maintainers: @{maintainers}",
        author = author,
        community = config.community_name,
        link = config.command_link,
        sig = sig,
        base = config.sig_link_base.trim_end_matches('/'),
        maintainers = owners.maintainers.join(MENTION_SEPARATOR),
    );

    if owners.has_committers() {
        comment.push_str(", any of the committers: @");
        comment.push_str(&owners.committers.join(MENTION_SEPARATOR));
    }
    comment
}
