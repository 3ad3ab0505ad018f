//! Display grouping for the utility panel
//!
//! Utilities are shown in groups of up to 20 tags, each group split into two
//! columns of up to 10 so the panel reads top-to-bottom, left-to-right.

/// Tags per display group
pub const GROUP_SIZE: usize = 20;
/// Tags per column within a group
pub const COLUMN_SIZE: usize = 10;

/// A display group: left and right columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayGroup<T> {
    pub left: Vec<T>,
    pub right: Vec<T>,
}

/// Partition an ordered list into display groups
pub fn group_for_display<T: Clone>(items: &[T]) -> Vec<DisplayGroup<T>> {
    items
        .chunks(GROUP_SIZE)
        .map(|chunk| {
            let split = chunk.len().min(COLUMN_SIZE);
            DisplayGroup {
                left: chunk[..split].to_vec(),
                right: chunk[split..].to_vec(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_list_fills_left_column_only() {
        let groups = group_for_display(&[1, 2, 3]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].left, vec![1, 2, 3]);
        assert!(groups[0].right.is_empty());
    }

    #[test]
    fn eleven_items_spill_into_right_column() {
        let items: Vec<u32> = (0..11).collect();
        let groups = group_for_display(&items);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].left.len(), 10);
        assert_eq!(groups[0].right, vec![10]);
    }

    #[test]
    fn twenty_one_items_open_a_second_group() {
        let items: Vec<u32> = (0..21).collect();
        let groups = group_for_display(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].left.len(), 10);
        assert_eq!(groups[0].right.len(), 10);
        assert_eq!(groups[1].left, vec![20]);
        assert!(groups[1].right.is_empty());
    }

    #[test]
    fn no_column_ever_exceeds_ten() {
        let items: Vec<u32> = (0..97).collect();
        for group in group_for_display(&items) {
            assert!(group.left.len() <= COLUMN_SIZE);
            assert!(group.right.len() <= COLUMN_SIZE);
            assert!(group.left.len() + group.right.len() <= GROUP_SIZE);
        }
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = group_for_display::<u32>(&[]);
        assert!(groups.is_empty());
    }

    #[test]
    fn order_is_preserved_across_groups() {
        let items: Vec<u32> = (0..25).collect();
        let groups = group_for_display(&items);
        let mut flattened: Vec<u32> = Vec::new();
        for group in &groups {
            flattened.extend(group.left.iter().copied());
            flattened.extend(group.right.iter().copied());
        }
        assert_eq!(flattened, items);
    }
}
