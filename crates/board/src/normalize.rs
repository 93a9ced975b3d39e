//! Grouping of flat board items into columns.

use crate::{RemoteBoardColumn, RemoteItem};

/// Groups items by their `column` value.
///
/// Columns appear in the order their name is first seen; within a column,
/// items keep their input order. An item with an empty column value lands in
/// a column whose name is the empty string.
pub fn group_by_column(items: impl IntoIterator<Item = RemoteItem>) -> Vec<RemoteBoardColumn> {
    let mut columns: Vec<RemoteBoardColumn> = Vec::new();
    for item in items {
        let position = match columns.iter().position(|c| c.name == item.column) {
            Some(position) => position,
            None => {
                columns.push(RemoteBoardColumn {
                    name: item.column.clone(),
                    items: Vec::new(),
                });
                columns.len() - 1
            }
        };
        columns[position].items.push(item.into());
    }
    columns
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ItemId;

    fn item(id: &str, column: &str) -> RemoteItem {
        RemoteItem {
            id: ItemId::new(id).unwrap(),
            name: format!("item {id}"),
            body: String::new(),
            column: column.to_string(),
        }
    }

    fn shape(columns: &[RemoteBoardColumn]) -> Vec<(&str, Vec<&str>)> {
        columns
            .iter()
            .map(|c| {
                (
                    c.name.as_str(),
                    c.items.iter().map(|i| i.id.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn preserves_first_seen_column_order_and_item_order() {
        let columns = group_by_column(vec![
            item("1", "Done"),
            item("2", "Todo"),
            item("3", "Done"),
            item("4", "In Progress"),
            item("5", "Todo"),
        ]);

        assert_eq!(
            shape(&columns),
            vec![
                ("Done", vec!["1", "3"]),
                ("Todo", vec!["2", "5"]),
                ("In Progress", vec!["4"]),
            ]
        );
    }

    #[test]
    fn missing_column_value_groups_under_empty_name() {
        let columns = group_by_column(vec![item("1", ""), item("2", "Todo"), item("3", "")]);
        assert_eq!(shape(&columns), vec![("", vec!["1", "3"]), ("Todo", vec!["2"])]);
    }

    #[test]
    fn no_items_means_no_columns() {
        assert!(group_by_column(Vec::new()).is_empty());
    }

    #[test]
    fn item_fields_carry_over() {
        let mut source = item("7", "Todo");
        source.body = "details".into();
        let columns = group_by_column(vec![source]);
        assert_eq!(columns[0].items[0].name, "item 7");
        assert_eq!(columns[0].items[0].body, "details");
    }
}
