//! Username to profile lookup via `getuserinfo`.

use crate::export::{fetch_json_array, invalid_url, ExportClient, ExportError};
use crate::model::ProfileInfo;

/// Fetch profile metadata for `username`. Returns the first record of the response;
/// an empty array is [ExportError::UserNotFound].
pub fn get_info(client: &mut ExportClient, username: &str) -> Result<ProfileInfo, ExportError> {
    let url = client
        .endpoints()
        .user_info_url(username)
        .map_err(|e| invalid_url(&client.endpoints().api_base, e))?;
    let items: Vec<ProfileInfo> = fetch_json_array(client, url)?;
    items
        .into_iter()
        .next()
        .ok_or_else(|| ExportError::UserNotFound {
            username: username.to_string(),
        })
}
