use crate::model::row::RawRow;
use serde::Deserialize;

/// Query string of `GET /validate-number`.
#[derive(Deserialize, Debug, Default)]
pub struct ValidateNumberQuery {
    pub number: Option<String>,
}

/// Body of `POST /api/files/process-rows`: rows already parsed by the client.
#[derive(Deserialize, Debug)]
pub struct ProcessRowsRequest {
    pub rows: Vec<RawRow>,
}
