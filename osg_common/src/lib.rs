mod api_token;
mod money;

pub use api_token::ApiToken;
pub use money::{Money, MoneyConversionError};
