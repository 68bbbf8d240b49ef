//! REST API consumed by the dashboard
//!
//! Usage:
//! 1. Start the server (`bhavcopy-server`)
//! 2. `POST /processEquityBhavcopy {"date": "ddmmyy"}` to load a session
//! 3. Query `/top10stocks`, `/stocks/{name}` and the favorites routes
//! 4. `POST /fetchAndStoreStockData {"stockName": ...}` to build chart data
//!    from the files downloaded at startup

pub mod handlers;
mod server;
mod types;

pub use server::{build_router, serve};
pub use types::{
    AddFavoriteRequest,
    ApiMessage,
    DownloadHistoryRequest,
    Empty,
    FetchStockDataRequest,
    HealthResponse,
    ProcessBhavcopyRequest,
};
