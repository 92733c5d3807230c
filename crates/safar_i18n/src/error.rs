use thiserror::Error;

use crate::catalog::CatalogError;
use crate::prefs::PrefsError;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Prefs(#[from] PrefsError),
}
