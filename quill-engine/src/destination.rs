/// Sink the rendered text is appended to.
pub trait DestinationStream {
    fn write(&mut self, text: &str);
}

impl DestinationStream for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Collects each write separately, for tests that check write boundaries.
impl DestinationStream for Vec<String> {
    fn write(&mut self, text: &str) {
        self.push(text.to_string());
    }
}
