//! WhatsApp click-to-chat links.

const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Builds `https://wa.me/<digits>?text=<encoded message>`.
///
/// Non-digit characters are stripped from `phone`, so `+34 600-11 22 33`
/// becomes `34600112233`. An empty phone yields a contact-picker link.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let digits = phone
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    format!(
        "{WHATSAPP_BASE_URL}{digits}?text={}",
        urlencoding::encode(message)
    )
}
