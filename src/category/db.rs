//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, NewCategory},
    pagination::Page,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the name is empty or only whitespace,
/// - [Error::DuplicateCategoryName] if a category with the same name exists,
/// - or [Error::SqlError] there is some other SQL error.
pub fn create_category(new_category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    let name = CategoryName::new(&new_category.name)?;

    let category = connection
        .prepare(
            "INSERT INTO category (name, description) VALUES (?1, ?2)
             RETURNING id, name, description",
        )?
        .query_row((name.as_ref(), &new_category.description), map_row)
        .map_err(|error| map_unique_violation(error, &name))?;

    tracing::debug!("Created category {} \"{}\"", category.id, category.name);

    Ok(category)
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `category_id` does not refer to a category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, description FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve categories ordered alphabetically by name, windowed by `page`.
pub fn list_categories(page: Page, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT id, name, description FROM category ORDER BY name ASC, id ASC {}",
            page.sql_clause()
        ))?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Replace a category's name and description.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the new name is empty or only whitespace,
/// - [Error::NotFound] if `category_id` does not refer to a category,
/// - [Error::DuplicateCategoryName] if another category already has the new name,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_category(
    category_id: CategoryId,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = CategoryName::new(&new_category.name)?;

    connection
        .prepare(
            "UPDATE category SET name = ?1, description = ?2 WHERE id = ?3
             RETURNING id, name, description",
        )?
        .query_row(
            (name.as_ref(), &new_category.description, category_id),
            map_row,
        )
        .map_err(|error| map_unique_violation(error, &name))
}

/// Delete a category by ID.
///
/// Expenses in the category are kept, they just lose the link to it.
///
/// # Errors
/// Returns [Error::NotFound] if `category_id` does not refer to a category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    tracing::debug!("Deleted category {category_id}");

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_unique_violation(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
            Error::DuplicateCategoryName(name.to_string())
        }
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let description = row.get(2)?;

    Ok(Category {
        id,
        name,
        description,
    })
}

#[cfg(test)]
mod category_query_tests {
    use std::collections::HashSet;

    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            CategoryName, NewCategory, create_category, delete_category, get_category,
            list_categories, update_category,
        },
        pagination::Page,
    };

    use super::create_category_table;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();

        let category = create_category(
            NewCategory::named("Groceries").description("Food and household"),
            &connection,
        )
        .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, CategoryName::new_unchecked("Groceries"));
        assert_eq!(category.description.as_deref(), Some("Food and household"));
    }

    #[test]
    fn create_category_fails_on_empty_name() {
        let connection = get_test_db_connection();

        let got = create_category(NewCategory::named("  "), &connection);

        assert_eq!(got, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn create_category_fails_on_duplicate_name() {
        let connection = get_test_db_connection();
        create_category(NewCategory::named("Rent"), &connection).unwrap();

        let got = create_category(NewCategory::named(" Rent "), &connection);

        assert_eq!(got, Err(Error::DuplicateCategoryName("Rent".to_owned())));
    }

    #[test]
    fn get_category_succeeds() {
        let connection = get_test_db_connection();
        let inserted = create_category(NewCategory::named("Foo"), &connection).unwrap();

        let selected = get_category(inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_missing_category_is_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(get_category(1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn list_categories_is_sorted_by_name() {
        let connection = get_test_db_connection();
        for name in ["Travel", "Bills", "Groceries"] {
            create_category(NewCategory::named(name), &connection).unwrap();
        }

        let got = list_categories(Page::default(), &connection).unwrap();

        let names: Vec<_> = got.iter().map(|category| category.name.to_string()).collect();
        assert_eq!(names, vec!["Bills", "Groceries", "Travel"]);
    }

    #[test]
    fn list_categories_respects_page() {
        let connection = get_test_db_connection();
        let mut want = HashSet::new();
        for name in ["A", "B", "C", "D"] {
            let category = create_category(NewCategory::named(name), &connection).unwrap();
            if name == "B" || name == "C" {
                want.insert(category);
            }
        }

        let got: HashSet<_> = list_categories(Page::new(1, 2), &connection)
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(got, want);
    }

    #[test]
    fn update_category_succeeds() {
        let connection = get_test_db_connection();
        let category = create_category(NewCategory::named("Food"), &connection).unwrap();

        let updated = update_category(
            category.id,
            NewCategory::named("Groceries"),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, category.id);
        assert_eq!(updated.name.as_ref(), "Groceries");
        assert_eq!(get_category(category.id, &connection), Ok(updated));
    }

    #[test]
    fn update_missing_category_is_not_found() {
        let connection = get_test_db_connection();

        let got = update_category(99, NewCategory::named("Groceries"), &connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn update_category_to_existing_name_fails() {
        let connection = get_test_db_connection();
        create_category(NewCategory::named("Rent"), &connection).unwrap();
        let other = create_category(NewCategory::named("Bills"), &connection).unwrap();

        let got = update_category(other.id, NewCategory::named("Rent"), &connection);

        assert_eq!(got, Err(Error::DuplicateCategoryName("Rent".to_owned())));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_db_connection();
        let category = create_category(NewCategory::named("Rent"), &connection).unwrap();

        assert_eq!(delete_category(category.id, &connection), Ok(()));
        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_category_is_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(delete_category(3, &connection), Err(Error::NotFound));
    }
}
