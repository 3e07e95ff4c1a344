pub mod request;
pub mod response;

pub use request::{EstimationRequest, TimeseriesRequest};
pub use response::{
    EstimateResults, EstimationMethod, EstimationResponse, ResultRecord, ReturnRecord,
    TickerEstimate, TimeseriesResponse, STATUS_OK,
};
