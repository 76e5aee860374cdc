pub mod coerce;
pub mod dj;
pub mod gemini;
pub mod sheets;
pub mod tts;

pub use dj::RadioDj;
pub use gemini::GeminiClient;
pub use sheets::SheetsClient;
pub use tts::TtsClient;
