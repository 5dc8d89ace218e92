use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

pub const CSV_MIME: &str = "text/csv";
pub const XLS_MIME: &str = "application/vnd.ms-excel";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Csv,
    Excel,
}

impl DatasetFormat {
    /// Detect by file extension first, then by MIME type
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Option<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => return Some(Self::Csv),
            Some("xls") | Some("xlsx") => return Some(Self::Excel),
            _ => {},
        }

        let mime = mime_type?.split(';').next()?.trim().to_ascii_lowercase();
        match mime.as_str() {
            CSV_MIME => Some(Self::Csv),
            XLS_MIME | XLSX_MIME => Some(Self::Excel),
            _ => None,
        }
    }

    pub fn default_mime(self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Excel => XLSX_MIME,
        }
    }

    /// Only delimited text can be profiled or sent as model context
    pub fn is_tabular_text(self) -> bool {
        matches!(self, Self::Csv)
    }
}

/// A row of `uploaded_files`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DatasetRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) const DATASET_COLUMNS: &str =
    "id, user_id, file_name, file_path, file_size, mime_type, checksum, created_at";

impl DatasetRecord {
    pub fn format(&self) -> Option<DatasetFormat> {
        DatasetFormat::detect(&self.file_name, self.mime_type.as_deref())
    }

    /// Fetch a dataset only if it belongs to `user_id`
    pub async fn find_owned<'e, E>(
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM uploaded_files WHERE id = $1 AND user_id = $2",
            DATASET_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(DatasetFormat::detect("sales.csv", None), Some(DatasetFormat::Csv));
        assert_eq!(DatasetFormat::detect("Sales.CSV", None), Some(DatasetFormat::Csv));
        assert_eq!(DatasetFormat::detect("q1.xlsx", None), Some(DatasetFormat::Excel));
        assert_eq!(DatasetFormat::detect("old.xls", None), Some(DatasetFormat::Excel));
    }

    #[test]
    fn test_detect_by_mime() {
        assert_eq!(
            DatasetFormat::detect("export", Some("text/csv; charset=utf-8")),
            Some(DatasetFormat::Csv)
        );
        assert_eq!(
            DatasetFormat::detect("export.bin", Some(XLSX_MIME)),
            Some(DatasetFormat::Excel)
        );
    }

    #[test]
    fn test_detect_rejects_other_types() {
        assert_eq!(DatasetFormat::detect("notes.txt", Some("text/plain")), None);
        assert_eq!(DatasetFormat::detect("image.png", None), None);
        assert_eq!(DatasetFormat::detect("", None), None);
    }

    #[test]
    fn test_extension_wins_over_mime() {
        assert_eq!(
            DatasetFormat::detect("data.csv", Some("application/octet-stream")),
            Some(DatasetFormat::Csv)
        );
    }
}
