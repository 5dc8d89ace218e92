pub mod get;
pub mod list;
pub mod overview;

pub use get::{GetDatasetError, GetDatasetQuery};
pub use list::{ListDatasetsError, ListDatasetsQuery};
pub use overview::{DatasetOverviewResponse, GetDatasetOverviewError, GetDatasetOverviewQuery};
