use crate::api::client::JoinInfo;
use crate::booking::resource::ResourceId;
use crate::display::agenda::format_price;

pub const MISSING_INVITE_CODE: &str = "No invite code provided.";

#[derive(Debug, Clone, PartialEq)]
pub enum JoinView {
    PayToJoin { session_id: ResourceId, price_cents: u32 },
    Links { zoom: Option<String>, discord: Option<String> },
    NoLinks,
}

impl JoinView {
    pub fn from_info(info: &JoinInfo) -> Self {
        let zoom = info.zoom_link.clone().filter(|l| !l.is_empty());
        let discord = info.discord_invite_link.clone().filter(|l| !l.is_empty());

        match (zoom, discord) {
            (None, None) if info.price_per_seat > 0 => JoinView::PayToJoin {
                session_id: info.session_id,
                price_cents: info.price_per_seat,
            },
            (None, None) => JoinView::NoLinks,
            (zoom, discord) => JoinView::Links { zoom, discord },
        }
    }

    pub fn render(&self) -> String {
        match self {
            JoinView::PayToJoin { price_cents, .. } => format!(
                "Pay & Join\nThis class costs {}.",
                format_price(*price_cents)
            ),
            JoinView::Links { zoom, discord } => {
                let mut lines = vec!["Your Classroom".to_string()];
                if let Some(zoom) = zoom {
                    lines.push(format!("Join via Zoom: {}", zoom));
                }
                if let Some(discord) = discord {
                    lines.push(format!("Join Discord Channel: {}", discord));
                }
                lines.join("\n")
            }
            JoinView::NoLinks => "Your Classroom\nNo links available.".to_string(),
        }
    }
}
