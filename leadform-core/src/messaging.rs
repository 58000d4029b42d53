pub const DEFAULT_DESTINATION: &str = "5511999999999";
pub const DEFAULT_MESSAGE: &str = "Hi, I'd like to talk to a specialist about a payroll loan";

/// Pre-filled message opened in the messaging app after a submission.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn deep_link(&self, destination: &str) -> String {
        deep_link(destination, &self.text)
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE)
    }
}

pub fn deep_link(destination: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        destination,
        urlencoding::encode(message)
    )
}

pub fn is_valid_destination(destination: &str) -> bool {
    (10..=15).contains(&destination.len()) && destination.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link_encodes_message() {
        let link = deep_link("5511912345678", "Hi there, I'd like a quote");
        assert_eq!(
            link,
            "https://wa.me/5511912345678?text=Hi%20there%2C%20I%27d%20like%20a%20quote"
        );
    }

    #[test]
    fn test_default_template() {
        let link = MessageTemplate::default().deep_link(DEFAULT_DESTINATION);
        assert!(link.starts_with("https://wa.me/5511999999999?text=Hi%2C%20"));
    }

    #[test]
    fn test_destination_rules() {
        assert!(is_valid_destination("5511999999999"));
        assert!(is_valid_destination("1199999999"));
        assert!(!is_valid_destination("119999999"));
        assert!(!is_valid_destination("+5511999999999"));
        assert!(!is_valid_destination("5511999999999999"));
    }
}
