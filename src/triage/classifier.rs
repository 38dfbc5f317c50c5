//! Labels messages as special (media, links, protocol noise) or ordinary.

use crate::base::types::{Element, InboundMessage, MessageClass};

/// Content markers that make a message special.
const SPECIAL_MARKERS: [&str; 4] = [":poke", "file://", "http://", "https://"];

/// Classify a message.
///
/// A message is special if its first element is a mention or a file, or if its
/// content carries a poke marker, a file URL, or a web link.
pub fn classify(message: &InboundMessage) -> MessageClass {
    let leads_with_attachment = matches!(message.elements.first(), Some(Element::Mention { .. } | Element::File { .. }));
    let has_marker = SPECIAL_MARKERS.iter().any(|marker| message.content.contains(marker));

    if leads_with_attachment || has_marker { MessageClass::Special } else { MessageClass::Ordinary }
}
