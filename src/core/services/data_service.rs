use tracing::warn;

use crate::domain::FinanceData;

pub struct DataService;

impl DataService {
    /// Wipes every record but keeps the category list, and starts a fresh
    /// achievement catalogue and level.
    pub fn clear_all(data: &mut FinanceData) {
        let categories = std::mem::take(&mut data.categories);
        *data = FinanceData::empty_with_categories(categories);
        warn!("all data cleared");
    }
}
