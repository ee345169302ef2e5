use super::{ensure_unique, require_text, ServiceError, ServiceResult};
use crate::domain::{Category, CategoryKind, FinanceData};

pub struct CategoryService;

impl CategoryService {
    pub fn add(data: &mut FinanceData, category: Category) -> ServiceResult<()> {
        require_text(&category.name, "Category name")?;
        ensure_unique(
            data.categories.iter().map(|existing| existing.name.as_str()),
            &category.name,
            "Category",
        )?;
        data.categories.push(Category {
            name: category.name.trim().to_string(),
            ..category
        });
        data.touch();
        Ok(())
    }

    /// Refuses to drop a category that budgets or recurring templates still point at.
    pub fn remove(data: &mut FinanceData, name: &str) -> ServiceResult<Category> {
        let index = data
            .categories
            .iter()
            .position(|category| category.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ServiceError::NotFound(format!("Category `{}`", name.trim())))?;
        let target = data.categories[index].name.clone();
        let in_budget = data
            .budgets
            .iter()
            .any(|budget| budget.category.eq_ignore_ascii_case(&target));
        let in_recurring = data
            .recurring
            .iter()
            .any(|series| series.category.eq_ignore_ascii_case(&target));
        if in_budget || in_recurring {
            return Err(ServiceError::Invalid(format!(
                "Category `{target}` is used by budgets or recurring transactions"
            )));
        }
        let removed = data.categories.remove(index);
        data.touch();
        Ok(removed)
    }

    pub fn list(data: &FinanceData, kind: Option<CategoryKind>) -> Vec<&Category> {
        data.categories
            .iter()
            .filter(|category| kind.map_or(true, |kind| category.kind == kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Budget;
    use chrono::NaiveDate;

    #[test]
    fn add_and_list_by_kind() {
        let mut data = FinanceData::seeded();
        CategoryService::add(&mut data, Category::new(" Gifts ", CategoryKind::Income, "🎁"))
            .expect("add");
        assert!(data.category("gifts").is_some());
        assert_eq!(CategoryService::list(&data, Some(CategoryKind::Income)).len(), 4);
        assert!(CategoryService::add(&mut data, Category::new("FOOD", CategoryKind::Expense, ""))
            .is_err());
    }

    #[test]
    fn remove_guards_budgeted_categories() {
        let mut data = FinanceData::seeded();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        data.budgets.push(Budget::new("Food", 100.0, start));
        assert!(matches!(
            CategoryService::remove(&mut data, "food"),
            Err(ServiceError::Invalid(_))
        ));
        CategoryService::remove(&mut data, "Health").expect("remove");
        assert!(data.category("Health").is_none());
        assert!(matches!(
            CategoryService::remove(&mut data, "Health"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
