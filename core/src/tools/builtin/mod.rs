//! Built-in tool implementations

mod calculator;
mod cep;
mod char_count;
mod country;
mod email;
mod hash;
mod sentiment;
mod text_analysis;

pub use calculator::CalculatorTool;
pub use cep::CepLookupTool;
pub use char_count::CharCountTool;
pub use country::CountryInfoTool;
pub use email::EmailExtractTool;
pub use hash::HashTool;
pub use sentiment::SentimentTool;
pub use text_analysis::TextAnalysisTool;
