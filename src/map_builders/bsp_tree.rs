use bracket_random::prelude::RandomNumberGenerator;

/// Binary space partition node. Splits alternate between vertical and
/// horizontal cuts, forced whenever a node grows too wide or too tall for
/// the aspect limit, and stop once a cut can no longer leave both halves at
/// the minimum leaf size.
pub struct BspNode {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub children: Option<Box<(BspNode, BspNode)>>,
}

const MAX_ASPECT_RATIO: f32 = 1.5;

impl BspNode {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> BspNode {
        BspNode {
            x,
            y,
            width,
            height,
            children: None,
        }
    }

    pub fn split_recursive(
        &mut self,
        rng: &mut RandomNumberGenerator,
        depth: i32,
        min_width: i32,
        min_height: i32,
    ) {
        if depth == 0 {
            return;
        }

        let can_split_vertically = self.width >= 2 * min_width;
        let can_split_horizontally = self.height >= 2 * min_height;
        if !can_split_vertically && !can_split_horizontally {
            return;
        }

        let vertical = if !can_split_horizontally {
            true
        } else if !can_split_vertically {
            false
        } else if self.width as f32 / self.height as f32 > MAX_ASPECT_RATIO {
            true
        } else if self.height as f32 / self.width as f32 > MAX_ASPECT_RATIO {
            false
        } else {
            rng.roll_dice(1, 2) == 1
        };

        let (mut first, mut second) = if vertical {
            let cut = rng.range(min_width, self.width - min_width + 1);
            (
                BspNode::new(self.x, self.y, cut, self.height),
                BspNode::new(self.x + cut, self.y, self.width - cut, self.height),
            )
        } else {
            let cut = rng.range(min_height, self.height - min_height + 1);
            (
                BspNode::new(self.x, self.y, self.width, cut),
                BspNode::new(self.x, self.y + cut, self.width, self.height - cut),
            )
        };

        first.split_recursive(rng, depth - 1, min_width, min_height);
        second.split_recursive(rng, depth - 1, min_width, min_height);
        self.children = Some(Box::new((first, second)));
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_leaves<'a>(node: &'a BspNode, out: &mut Vec<&'a BspNode>) {
        match &node.children {
            None => out.push(node),
            Some(pair) => {
                collect_leaves(&pair.0, out);
                collect_leaves(&pair.1, out);
            }
        }
    }

    #[test]
    fn leaves_tile_the_root_exactly() {
        let mut rng = RandomNumberGenerator::seeded(5);
        let mut root = BspNode::new(0, 0, 80, 43);
        root.split_recursive(&mut rng, 5, 7, 7);

        let mut leaves = Vec::new();
        collect_leaves(&root, &mut leaves);
        assert!(leaves.len() > 1);

        let area: i32 = leaves.iter().map(|l| l.width * l.height).sum();
        assert_eq!(area, 80 * 43);
        for leaf in leaves.iter() {
            assert!(leaf.width >= 7 && leaf.height >= 7);
            assert!(leaf.x >= 0 && leaf.y >= 0);
            assert!(leaf.x + leaf.width <= 80 && leaf.y + leaf.height <= 43);
        }
    }

    #[test]
    fn tiny_nodes_refuse_to_split() {
        let mut rng = RandomNumberGenerator::seeded(6);
        let mut root = BspNode::new(0, 0, 10, 10);
        root.split_recursive(&mut rng, 5, 7, 7);
        assert!(root.is_leaf());
    }
}
