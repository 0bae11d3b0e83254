//! Implements the `Sheet` trait with a `sheets::Client` pointed at the ledger spreadsheet.

use crate::api::{Sheet, SheetRange, TokenProvider};
use crate::model::cell::{self, Column};
use crate::{Config, Result};
use anyhow::Context;
use sheets::types::{
    BatchUpdateValuesRequest, DateTimeRenderOption, Dimension, ValueInputOption, ValueRange,
    ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

/// A `Sheet` backed by Google. The client is rebuilt before each call so that it always carries
/// an unexpired access token from the `TokenProvider`.
pub(super) struct GoogleSheet {
    config: Config,
    token_provider: TokenProvider,
    client: sheets::Client,
}

impl GoogleSheet {
    pub(super) async fn new(config: Config, mut token_provider: TokenProvider) -> Result<Self> {
        let client = sheets_client(&mut token_provider).await?;
        Ok(Self {
            config,
            token_provider,
            client,
        })
    }

    async fn refresh_client(&mut self) -> Result<()> {
        self.client = sheets_client(&mut self.token_provider).await?;
        Ok(())
    }

    /// Formatted values of `range`, one inner vector per row.
    async fn values(&mut self, range: &str) -> Result<Vec<Vec<String>>> {
        self.refresh_client().await?;
        let response = self
            .client
            .spreadsheets()
            .values_get(
                self.config.spreadsheet_id(),
                range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)?;
        Ok(response.body.values)
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, tab: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {tab}");
        self.values(&cell::full_range(tab))
            .await
            .with_context(|| format!("Failed to fetch {tab} sheet data"))
    }

    async fn column(&mut self, tab: &str, column: Column) -> Result<Vec<String>> {
        trace!("column {column} for {tab}");
        let rows = self
            .values(&cell::column_range(tab, column))
            .await
            .with_context(|| format!("Failed to fetch column {column} of {tab}"))?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }

    async fn tab_names(&mut self) -> Result<Vec<String>> {
        trace!("tab_names");
        self.refresh_client().await?;
        let response = self
            .client
            .spreadsheets()
            .get(self.config.spreadsheet_id(), false, &[])
            .await
            .map_err(map_client_error)
            .context("Failed to fetch the spreadsheet tabs")?;
        Ok(response
            .body
            .sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .map(|properties| properties.title)
            .collect())
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Result<()> {
        trace!("write_ranges for {} ranges", data.len());
        self.refresh_client().await?;
        let request = batch_update(data);
        self.client
            .spreadsheets()
            .values_batch_update(self.config.spreadsheet_id(), &request)
            .await
            .map_err(map_client_error)
            .context("Failed to write ranges")?;
        Ok(())
    }
}

/// One batch update for all of `data`, parsed as if typed into the sheet.
fn batch_update(data: &[SheetRange]) -> BatchUpdateValuesRequest {
    BatchUpdateValuesRequest {
        data: data
            .iter()
            .map(|sr| ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: sr.range.clone(),
                values: sr.values.clone(),
            })
            .collect(),
        include_values_in_response: Some(false),
        response_date_time_render_option: None,
        response_value_render_option: None,
        value_input_option: Some(ValueInputOption::UserEntered),
    }
}

/// Only the access token matters to the client; we refresh it ourselves.
async fn sheets_client(token_provider: &mut TokenProvider) -> Result<sheets::Client> {
    let access_token = token_provider.token_with_refresh().await?;
    Ok(sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        access_token.to_string(),
        String::new(),
    ))
}

/// `ClientError` displays little on its own, so the variant name is added as context.
fn map_client_error(e: ClientError) -> anyhow::Error {
    let variant = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_update_is_user_entered_rows() {
        let ranges = vec![
            SheetRange::single("'3월'!C21", "2025-03-01"),
            SheetRange::single("'3월'!D21", "15000"),
        ];
        let request = batch_update(&ranges);
        assert_eq!(request.data.len(), 2);
        assert_eq!(request.data[1].range, "'3월'!D21");
        assert_eq!(request.data[1].values, vec![vec!["15000".to_string()]]);
        assert!(matches!(request.data[0].major_dimension, Some(Dimension::Rows)));
        assert!(matches!(
            request.value_input_option,
            Some(ValueInputOption::UserEntered)
        ));
        assert_eq!(request.include_values_in_response, Some(false));
    }

    #[test]
    fn test_map_client_error_names_variant() {
        let e = map_client_error(ClientError::EmptyRefreshToken);
        assert_eq!(e.to_string(), "EmptyRefreshToken");
        assert!(e.downcast_ref::<ClientError>().is_some());
    }
}
