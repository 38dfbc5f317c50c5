//! Private vs group session routing.

use crate::base::types::InboundMessage;

use super::classifier::classify;

/// Whether the message belongs to a direct conversation.
///
/// An explicit direct flag wins; without one, the subtype or the channel ID
/// decides. Special messages are never private.
pub fn is_private(message: &InboundMessage) -> bool {
    if classify(message).is_special() {
        return false;
    }

    match message.is_direct {
        Some(is_direct) => is_direct,
        None => message.subtype.as_deref() == Some("private") || message.channel_id.contains("private"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::tests::{direct_message, message};

    #[test]
    fn direct_flag_decides() {
        assert!(is_private(&direct_message("hi")));

        let mut group = message("hi");
        group.is_direct = Some(false);
        group.channel_id = "private:U1".to_string();

        assert!(!is_private(&group));
    }

    #[test]
    fn falls_back_to_subtype_and_channel() {
        let mut by_subtype = message("hi");
        by_subtype.subtype = Some("private".to_string());

        let mut by_channel = message("hi");
        by_channel.channel_id = "private:U1".to_string();

        assert!(is_private(&by_subtype));
        assert!(is_private(&by_channel));
        assert!(!is_private(&message("hi")));
    }

    #[test]
    fn special_is_never_private() {
        let msg = direct_message("https://example.com");

        assert!(!is_private(&msg));
        assert_eq!(is_private(&msg), is_private(&msg));
    }
}
