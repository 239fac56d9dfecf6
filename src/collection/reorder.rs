use crate::error::{OpsdeskError, Result};

/// Move the item at `from` so it ends up at index `to`, shifting the items between.
pub fn reorder<T>(mut list: Vec<T>, from: usize, to: usize) -> Result<Vec<T>> {
    let len = list.len();
    for index in [from, to] {
        if index >= len {
            return Err(OpsdeskError::IndexOutOfRange { index, len });
        }
    }

    let item = list.remove(from);
    list.insert(to, item);
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_forward() {
        let list = reorder(vec!['a', 'b', 'c', 'd'], 0, 2).unwrap();
        assert_eq!(list, vec!['b', 'c', 'a', 'd']);
    }

    #[test]
    fn test_move_backward() {
        let list = reorder(vec!['a', 'b', 'c', 'd'], 3, 1).unwrap();
        assert_eq!(list, vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn test_same_index_is_identity() {
        let list = reorder(vec![1, 2, 3], 1, 1).unwrap();
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_out_of_range() {
        let err = reorder(vec![1, 2, 3], 0, 3).unwrap_err();
        assert!(matches!(err, OpsdeskError::IndexOutOfRange { index: 3, len: 3 }));
        assert!(reorder(Vec::<u8>::new(), 0, 0).is_err());
    }
}
