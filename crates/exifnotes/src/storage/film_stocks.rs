use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::debug;

use super::{ensure_found, require_id, required_parsed_column, Storage};
use crate::error::Result;
use crate::model::FilmStock;

const ENTITY: &str = "film stock";

const SELECT_FILM_STOCK: &str = r"
    SELECT id, make, model, iso, film_type, process, preadded FROM film_stocks
";

/// Filter for [`Storage::list_film_stocks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmStockQuery {
    /// Only stocks from this manufacturer, compared case-insensitively.
    pub make: Option<String>,
    /// `Some(true)` for catalog stocks only, `Some(false)` for user-added only.
    pub preadded: Option<bool>,
}

impl Storage {
    /// Insert a user-defined film stock and return its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid stock, or a database error.
    pub fn add_film_stock(&self, stock: &FilmStock) -> Result<i64> {
        stock.validate()?;
        self.conn.execute(
            r"
            INSERT INTO film_stocks (make, model, iso, film_type, process, preadded)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                stock.make.trim(),
                stock.model.trim(),
                stock.iso,
                stock.film_type.as_str(),
                stock.process.as_str(),
                stock.preadded,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted film stock {} ({})", id, stock);
        Ok(id)
    }

    /// Overwrite a stored film stock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no film stock has the record's id.
    pub fn update_film_stock(&self, stock: &FilmStock) -> Result<()> {
        let id = require_id(ENTITY, stock.id)?;
        stock.validate()?;
        let affected = self.conn.execute(
            r"
            UPDATE film_stocks SET make = ?2, model = ?3, iso = ?4, film_type = ?5,
                                   process = ?6, preadded = ?7
            WHERE id = ?1
            ",
            params![
                id,
                stock.make.trim(),
                stock.model.trim(),
                stock.iso,
                stock.film_type.as_str(),
                stock.process.as_str(),
                stock.preadded,
            ],
        )?;
        ensure_found(ENTITY, id, affected)
    }

    /// Get a film stock by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_film_stock(&self, id: i64) -> Result<Option<FilmStock>> {
        let stock = self
            .conn
            .query_row(&format!("{SELECT_FILM_STOCK} WHERE id = ?1"), [id], row_to_film_stock)
            .optional()?;
        Ok(stock)
    }

    /// Film stocks matching `query`, ordered by make and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_film_stocks(&self, query: &FilmStockQuery) -> Result<Vec<FilmStock>> {
        let mut conditions = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(make) = &query.make {
            values.push(Value::Text(make.trim().to_string()));
            conditions.push(format!("make = ?{} COLLATE NOCASE", values.len()));
        }
        if let Some(preadded) = query.preadded {
            values.push(Value::Integer(i64::from(preadded)));
            conditions.push(format!("preadded = ?{}", values.len()));
        }

        let mut sql = SELECT_FILM_STOCK.to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY make COLLATE NOCASE, model COLLATE NOCASE");

        let mut stmt = self.conn.prepare(&sql)?;
        let stocks = stmt
            .query_map(params_from_iter(values), row_to_film_stock)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    /// Distinct film stock manufacturers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn film_stock_makes(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT make FROM film_stocks ORDER BY make COLLATE NOCASE",
        )?;
        let makes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(makes)
    }

    /// Delete a film stock. Rolls of it lose the reference.
    ///
    /// Returns `true` if a film stock was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_film_stock(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM film_stocks WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Check whether any roll references the film stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_film_stock_in_use(&self, id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rolls WHERE film_stock_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn row_to_film_stock(row: &Row) -> rusqlite::Result<FilmStock> {
    Ok(FilmStock {
        id: Some(row.get(0)?),
        make: row.get(1)?,
        model: row.get(2)?,
        iso: row.get(3)?,
        film_type: required_parsed_column(row, 4)?,
        process: required_parsed_column(row, 5)?,
        preadded: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{builtin_catalog, FilmProcess, FilmType, Roll};

    #[test]
    fn test_catalog_is_listed() {
        let storage = Storage::open_in_memory().unwrap();
        let all = storage.list_film_stocks(&FilmStockQuery::default()).unwrap();
        assert_eq!(all.len(), builtin_catalog().len());
        assert!(all.iter().all(|s| s.preadded));
    }

    #[test]
    fn test_query_by_make_and_source() {
        let storage = Storage::open_in_memory().unwrap();
        let mut stock = FilmStock::new("Kodak", "Double-X 5222", 250);
        stock.film_type = FilmType::BwCine;
        stock.process = FilmProcess::Bw;
        let id = storage.add_film_stock(&stock).unwrap();

        let custom = storage
            .list_film_stocks(&FilmStockQuery {
                make: None,
                preadded: Some(false),
            })
            .unwrap();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].id, Some(id));
        assert_eq!(custom[0].film_type, FilmType::BwCine);

        let kodak = storage
            .list_film_stocks(&FilmStockQuery {
                make: Some("kodak".to_string()),
                preadded: None,
            })
            .unwrap();
        assert!(kodak.iter().all(|s| s.make == "Kodak"));
        assert!(kodak.iter().any(|s| s.model == "Double-X 5222"));
    }

    #[test]
    fn test_makes() {
        let storage = Storage::open_in_memory().unwrap();
        let makes = storage.film_stock_makes().unwrap();
        assert!(makes.contains(&"Ilford".to_string()));
        let mut sorted = makes.clone();
        sorted.sort_by_key(|m| m.to_lowercase());
        assert_eq!(makes, sorted);
    }

    #[test]
    fn test_update_and_delete() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.add_film_stock(&FilmStock::new("Lomography", "Purple", 400)).unwrap();
        let mut stock = storage.get_film_stock(id).unwrap().unwrap();
        stock.iso = 200;
        storage.update_film_stock(&stock).unwrap();
        assert_eq!(storage.get_film_stock(id).unwrap().unwrap().iso, 200);

        let mut roll = Roll::new("Purple");
        roll.film_stock_id = Some(id);
        let roll_id = storage.add_roll(&roll).unwrap();
        assert!(storage.is_film_stock_in_use(id).unwrap());

        assert!(storage.delete_film_stock(id).unwrap());
        assert!(storage.get_roll(roll_id).unwrap().unwrap().film_stock_id.is_none());
    }
}
