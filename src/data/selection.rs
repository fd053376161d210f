use super::error::{DataError, Result};
use super::model::Table;

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// Restrict `table` to exactly the named columns, in the given order.
///
/// Passing every column name in original order returns an equal table.
pub fn select_columns(table: Table, names: &[String]) -> Result<Table> {
    if let Some(unknown) = names.iter().find(|n| table.column(n).is_none()) {
        return Err(DataError::ColumnNotFound(unknown.clone()));
    }

    let mut pool: Vec<Option<_>> = table.into_columns().into_iter().map(Some).collect();
    let columns = names
        .iter()
        .map(|name| {
            let idx = pool
                .iter()
                .position(|c| c.as_ref().is_some_and(|c| &c.name == name))
                .ok_or_else(|| DataError::ColumnNotFound(name.clone()))?;
            pool[idx]
                .take()
                .ok_or_else(|| DataError::ColumnNotFound(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("select_columns: kept {:?}", names);
    Table::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cleaning::{fill_missing_with_mean, remove_duplicates};
    use crate::data::loader::load_csv;
    use crate::data::model::CellValue;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_selection_is_identity() {
        let table = load_csv(b"a,b,c\n1,x,2.5\n2,y,\n").unwrap();
        let all = table.column_names();
        assert_eq!(select_columns(table.clone(), &all).unwrap(), table);
    }

    #[test]
    fn selection_follows_chosen_order() {
        let table = load_csv(b"a,b,c\n1,x,2.5\n").unwrap();
        let picked = select_columns(table, &names(&["c", "a"])).unwrap();
        assert_eq!(picked.column_names(), vec!["c", "a"]);
    }

    #[test]
    fn selecting_a_after_cleaning() {
        let mut table = load_csv(b"a,b\n1,2\n1,2\n3,\n").unwrap();
        remove_duplicates(&mut table);
        let only_a = select_columns(table.clone(), &names(&["a"])).unwrap();
        assert_eq!(only_a.width(), 1);
        assert_eq!(only_a.column("a").unwrap().values, vec![CellValue::Int(1), CellValue::Int(3)]);

        fill_missing_with_mean(&mut table);
        let only_a = select_columns(table, &names(&["a"])).unwrap();
        assert_eq!(only_a.column("a").unwrap().values, vec![CellValue::Int(1), CellValue::Int(3)]);
    }

    #[test]
    fn empty_selection_yields_empty_table() {
        let table = load_csv(b"a\n1\n").unwrap();
        let none = select_columns(table, &[]).unwrap();
        assert_eq!(none.width(), 0);
        assert!(none.is_empty());
    }

    #[test]
    fn unknown_or_repeated_column_is_an_error() {
        let table = load_csv(b"a\n1\n").unwrap();
        assert!(matches!(
            select_columns(table.clone(), &names(&["zz"])),
            Err(DataError::ColumnNotFound(ref n)) if n == "zz"
        ));
        assert!(select_columns(table, &names(&["a", "a"])).is_err());
    }
}
