//! Session command and query handlers.

mod budget;
mod cards;
mod continue_session;
mod get_progress;
mod start_session;
mod submit_response;

pub use budget::ExchangeBudget;
pub use continue_session::{
    ContinueSessionCommand, ContinueSessionHandler, ContinueSessionResult,
};
pub use get_progress::{GetProgressHandler, GetProgressQuery, ProgressView};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
pub use submit_response::{
    ResponseInput, SubmitResponseCommand, SubmitResponseHandler, SubmitResponseResult,
};
