use crate::geometry::{BoundingBox, World};

/// Cell assigned to the child at `index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub rect: BoundingBox<World>,
    pub index: usize,
}

/// Row-major grid used to subdivide a directory among its children.
pub struct GridLayout;

impl GridLayout {
    /// `(cols, rows)` for `count` cells: a square grid of side `ceil(sqrt(n))`.
    ///
    /// Cell size depends only on the side, so a partial last row leaves the
    /// bottom of the container empty.
    pub fn dimensions(count: usize) -> (usize, usize) {
        if count == 0 {
            return (0, 0);
        }
        let side = (count as f64).sqrt().ceil() as usize;
        (side, side)
    }

    /// Lay out `count` cells over `container` in listing order.
    ///
    /// Edges are computed from the container so the cells tile it without
    /// gaps or overlap.
    pub fn layout(count: usize, container: BoundingBox<World>) -> Vec<LayoutRect> {
        let (cols, rows) = Self::dimensions(count);
        let mut result = Vec::with_capacity(count);

        for index in 0..count {
            let col = index % cols;
            let row = index / cols;
            let left = Self::edge(container.left, container.width, col, cols);
            let right = Self::edge(container.left, container.width, col + 1, cols);
            let top = Self::edge(container.top, container.height, row, rows);
            let bottom = Self::edge(container.top, container.height, row + 1, rows);

            result.push(LayoutRect {
                rect: BoundingBox::new(top, left, right - left, bottom - top),
                index,
            });
        }

        result
    }

    fn edge(start: f64, length: f64, i: usize, n: usize) -> f64 {
        if i == n {
            start + length
        } else {
            start + length * i as f64 / n as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_children_three_by_three() {
        let container = BoundingBox::<World>::new(0.0, 0.0, 900.0, 900.0);
        let layout = GridLayout::layout(9, container);

        assert_eq!(GridLayout::dimensions(9), (3, 3));
        assert_eq!(layout.len(), 9);
        for (i, cell) in layout.iter().enumerate() {
            assert_eq!(cell.index, i);
            assert_eq!(cell.rect.width, 300.0);
            assert_eq!(cell.rect.height, 300.0);
            assert_eq!(cell.rect.left, (i % 3) as f64 * 300.0);
            assert_eq!(cell.rect.top, (i / 3) as f64 * 300.0);
        }
    }

    #[test]
    fn test_partial_last_row() {
        assert_eq!(GridLayout::dimensions(1), (1, 1));
        assert_eq!(GridLayout::dimensions(5), (3, 3));
        assert_eq!(GridLayout::dimensions(10), (4, 4));

        let square = BoundingBox::<World>::new(0.0, 0.0, 900.0, 900.0);
        let layout = GridLayout::layout(5, square);
        assert_eq!(layout.len(), 5);
        assert_eq!(layout[0].rect, BoundingBox::new(0.0, 0.0, 300.0, 300.0));
        assert_eq!(layout[4].rect, BoundingBox::new(300.0, 300.0, 300.0, 300.0));
        // Bottom row stays empty
        assert!(layout.iter().all(|cell| cell.rect.bottom() <= 600.0));

        let container = BoundingBox::<World>::new(10.0, 20.0, 300.0, 300.0);
        let layout = GridLayout::layout(5, container);
        assert_eq!(layout[3].rect, BoundingBox::new(110.0, 20.0, 100.0, 100.0));
        assert!(GridLayout::layout(0, container).is_empty());
    }

    #[test]
    fn test_cells_span_container_exactly() {
        let container = BoundingBox::<World>::new(0.3, 0.7, 1000.0 / 3.0, 1000.0 / 7.0);
        let layout = GridLayout::layout(7, container);
        let (cols, rows) = GridLayout::dimensions(7);

        // Right edge of the last column and bottom edge of the last row match the container
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        let last_col = &layout[cols - 1].rect;
        assert!(close(last_col.right(), container.right()));
        let last_row = &layout[(rows - 1) * cols].rect;
        assert!(close(last_row.bottom(), container.bottom()));
        assert_eq!((cols, rows), (3, 3));

        // Neighbouring cells share edges
        assert!(close(layout[0].rect.right(), layout[1].rect.left));
        let area: f64 = layout.iter().map(|cell| cell.rect.area()).sum();
        // 7 of 9 cells used
        assert!((area - container.area() * 7.0 / 9.0).abs() < 1e-6);
    }
}
