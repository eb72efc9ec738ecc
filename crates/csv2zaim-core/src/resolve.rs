//! Resolve configured names to Zaim IDs
//!
//! Runs once before any row is read, so a typo in the configuration fails
//! the run before anything is written.

use tracing::info;

use crate::config::Targets;
use crate::error::{Error, Result};
use crate::models::{MoneyMode, Named, ReferenceKind, ResolvedRefs};
use crate::zaim::ZaimApi;

/// Find the ID of the entry named exactly `name`
///
/// Active entries beat inactive ones, then the lowest ID wins, so the
/// result does not depend on list order.
pub fn find_by_name<'a, T, I>(items: I, name: &str) -> Option<i64>
where
    T: Named + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| item.name() == name)
        .min_by_key(|item| (!item.is_active(), item.id()))
        .map(|item| item.id())
}

/// Look up the account, payment category and genre named in `targets`
pub async fn resolve_refs(api: &dyn ZaimApi, targets: &Targets) -> Result<ResolvedRefs> {
    let unresolved = |kind: ReferenceKind, name: &str| Error::Unresolved {
        kind,
        name: name.to_string(),
    };

    let accounts = api.accounts().await?;
    let account_id = find_by_name(&accounts, &targets.account)
        .ok_or_else(|| unresolved(ReferenceKind::Account, &targets.account))?;
    info!("Resolved account '{}' -> {}", targets.account, account_id);

    let categories = api.categories().await?;
    let category_id = find_by_name(
        categories.iter().filter(|c| c.mode == MoneyMode::Payment),
        &targets.category,
    )
    .ok_or_else(|| unresolved(ReferenceKind::Category, &targets.category))?;
    info!("Resolved category '{}' -> {}", targets.category, category_id);

    // Genre names repeat across categories, so only look under the resolved one
    let genres = api.genres().await?;
    let genre_id = find_by_name(
        genres.iter().filter(|g| g.category_id == category_id),
        &targets.genre,
    )
    .ok_or_else(|| unresolved(ReferenceKind::Genre, &targets.genre))?;
    info!("Resolved genre '{}' -> {}", targets.genre, genre_id);

    Ok(ResolvedRefs {
        account_id,
        category_id,
        genre_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Category};
    use crate::zaim::MockZaim;

    fn account(id: i64, name: &str, active: i32) -> Account {
        Account {
            id,
            name: name.to_string(),
            active,
        }
    }

    fn targets() -> Targets {
        Targets {
            account: "Amex".into(),
            category: "食費".into(),
            genre: "食料品".into(),
        }
    }

    fn seeded() -> MockZaim {
        MockZaim::new()
            .with_account(1, "お財布")
            .with_account(3, "Amex")
            .with_category(101, "食費")
            .with_category(102, "日用雑貨")
            .with_genre(10101, 101, "食料品")
            .with_genre(10201, 102, "食料品")
    }

    #[test]
    fn test_find_by_name_exact_match_only() {
        let accounts = vec![account(1, "Amex Gold", 1), account(2, "Amex", 1)];
        assert_eq!(find_by_name(&accounts, "Amex"), Some(2));
        assert_eq!(find_by_name(&accounts, "amex"), None);
        assert_eq!(find_by_name(&accounts, "Visa"), None);
    }

    #[test]
    fn test_find_by_name_order_independent() {
        let mut accounts = vec![
            account(9, "Amex", 1),
            account(4, "Amex", 1),
            account(2, "Amex", -1),
            account(7, "Visa", 1),
        ];
        let forward = find_by_name(&accounts, "Amex");
        accounts.reverse();
        let backward = find_by_name(&accounts, "Amex");

        assert_eq!(forward, Some(4));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_find_by_name_falls_back_to_inactive() {
        let accounts = vec![account(2, "Old Card", -1)];
        assert_eq!(find_by_name(&accounts, "Old Card"), Some(2));
    }

    #[test]
    fn test_find_by_name_categories() {
        let categories = vec![Category {
            id: 101,
            name: "食費".into(),
            mode: MoneyMode::Payment,
            active: 1,
        }];
        assert_eq!(find_by_name(&categories, "食費"), Some(101));
    }

    #[tokio::test]
    async fn test_resolve_refs() {
        let refs = resolve_refs(&seeded(), &targets()).await.unwrap();
        assert_eq!(
            refs,
            ResolvedRefs {
                account_id: 3,
                category_id: 101,
                genre_id: 10101,
            }
        );
    }

    #[tokio::test]
    async fn test_income_category_with_same_name_ignored() {
        let zaim = MockZaim::new()
            .with_account(3, "Amex")
            .with_income_category(11, "食費")
            .with_category(101, "食費")
            .with_genre(1101, 11, "食料品")
            .with_genre(10101, 101, "食料品");

        let refs = resolve_refs(&zaim, &targets()).await.unwrap();
        assert_eq!(refs.category_id, 101);
        assert_eq!(refs.genre_id, 10101);
    }

    #[tokio::test]
    async fn test_only_income_category_is_unresolved() {
        let zaim = MockZaim::new()
            .with_account(3, "Amex")
            .with_income_category(11, "食費")
            .with_genre(1101, 11, "食料品");

        let err = resolve_refs(&zaim, &targets()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Unresolved {
                kind: ReferenceKind::Category,
                ref name
            } if name == "食費"
        ));
    }

    #[tokio::test]
    async fn test_genre_scoped_to_category() {
        let mut targets = targets();
        targets.category = "日用雑貨".into();
        let refs = resolve_refs(&seeded(), &targets).await.unwrap();
        assert_eq!(refs.genre_id, 10201);
    }

    #[tokio::test]
    async fn test_unresolved_names_identify_lookup() {
        let mut missing_account = targets();
        missing_account.account = "Visa".into();
        let err = resolve_refs(&seeded(), &missing_account).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Unresolved { kind: ReferenceKind::Account, ref name } if name == "Visa"
        ));
        assert_eq!(err.to_string(), "Could not resolve account: Visa");

        let mut missing_category = targets();
        missing_category.category = "交通".into();
        let err = resolve_refs(&seeded(), &missing_category).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Unresolved {
                kind: ReferenceKind::Category,
                ..
            }
        ));

        let mut missing_genre = targets();
        missing_genre.genre = "外食".into();
        let err = resolve_refs(&seeded(), &missing_genre).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Unresolved {
                kind: ReferenceKind::Genre,
                ..
            }
        ));
    }
}
