//! Skyline rectangle packing
//!
//! Bottom-left skyline packer: the packed area is described by a list of
//! horizontal segments (the "skyline"). A rectangle is placed at the position
//! that keeps its top edge lowest, leftmost on ties, and the skyline is
//! raised under it.
//!
//! Reference: Jukka Jylanki, "A Thousand Ways to Pack the Bin" (2010).

/// One horizontal segment of the skyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SkylineNode {
    x: u32,
    y: u32,
    width: u32,
}

/// Fixed-size skyline bin packer
#[derive(Debug, Clone)]
pub struct SkylinePacker {
    width: u32,
    height: u32,
    nodes: Vec<SkylineNode>,
}

impl SkylinePacker {
    /// Create a packer covering an empty `width` x `height` area
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            nodes: vec![SkylineNode {
                x: 0,
                y: 0,
                width,
            }],
        }
    }

    /// Packer area in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Find space for a `w` x `h` rectangle.
    ///
    /// Returns the top-left position, or `None` if the rectangle does not fit
    /// anywhere under the current skyline.
    pub fn pack(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w == 0 || h == 0 {
            return Some((0, 0));
        }
        if w > self.width || h > self.height {
            return None;
        }

        let mut best: Option<(usize, u32)> = None;
        for i in 0..self.nodes.len() {
            if self.nodes[i].x + w > self.width {
                break;
            }
            let Some(y) = self.fit(i, w) else {
                continue;
            };
            if y + h > self.height {
                continue;
            }
            if best.map_or(true, |(_, best_y)| y < best_y) {
                best = Some((i, y));
            }
        }

        let (idx, y) = best?;
        let x = self.nodes[idx].x;
        self.raise(idx, x, y + h, w);
        Some((x, y))
    }

    /// Pack a batch of rectangles, tallest first.
    ///
    /// Returns one position per input size, in input order, or `None` if any
    /// rectangle fails to fit. Zero-area sizes are placed at the origin and
    /// take no space.
    pub fn pack_all(&mut self, sizes: &[(u32, u32)]) -> Option<Vec<(u32, u32)>> {
        let mut order: Vec<usize> = (0..sizes.len()).collect();
        order.sort_by(|&a, &b| {
            let (aw, ah) = sizes[a];
            let (bw, bh) = sizes[b];
            bh.cmp(&ah).then(bw.cmp(&aw))
        });

        let mut positions = vec![(0, 0); sizes.len()];
        for idx in order {
            let (w, h) = sizes[idx];
            positions[idx] = self.pack(w, h)?;
        }
        Some(positions)
    }

    /// Reset to a single empty skyline segment covering the full width.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(SkylineNode {
            x: 0,
            y: 0,
            width: self.width,
        });
    }

    /// Resting height for a rectangle of width `w` whose left edge sits on node `idx`.
    fn fit(&self, idx: usize, w: u32) -> Option<u32> {
        let mut y = 0;
        let mut remaining = w;
        for node in &self.nodes[idx..] {
            y = y.max(node.y);
            if node.width >= remaining {
                return Some(y);
            }
            remaining -= node.width;
        }
        None
    }

    /// Insert a segment at `top` spanning `[x, x + w)` and trim the segments it covers.
    fn raise(&mut self, idx: usize, x: u32, top: u32, w: u32) {
        self.nodes.insert(
            idx,
            SkylineNode {
                x,
                y: top,
                width: w,
            },
        );

        let next = idx + 1;
        while next < self.nodes.len() {
            let covered_to = self.nodes[idx].x + self.nodes[idx].width;
            let node = &mut self.nodes[next];
            if node.x >= covered_to {
                break;
            }
            let shrink = covered_to - node.x;
            if node.width <= shrink {
                self.nodes.remove(next);
            } else {
                node.x += shrink;
                node.width -= shrink;
                break;
            }
        }

        // Merge neighbours at the same height.
        let mut i = 0;
        while i + 1 < self.nodes.len() {
            if self.nodes[i].y == self.nodes[i + 1].y {
                self.nodes[i].width += self.nodes[i + 1].width;
                self.nodes.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}
