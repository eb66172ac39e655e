//! Beachline: binary tree of arcs (leaves) and breakpoints (internal nodes).
//!
//! Purpose
//! - Locate the arc above a new site, split it, remove squeezed arcs, and walk to
//!   neighbouring arcs/breakpoints in `O(depth)`.
//!
//! Assumptions and conventions
//! - Nodes live in an arena and are addressed by `NodeId`; `parent` links are plain
//!   indices used for navigation only. Freed slots are recycled.
//! - In-order leaf order is the bottom-to-top (increasing y) order of the arcs.
//! - A breakpoint stores the regions of its in-order previous and next leaf, and the
//!   segment endpoint it is currently tracing.
//! - A leaf stores at most one circle event id. The event queue owns the event; the
//!   leaf only uses the id to tombstone it.
//!
//! Code cross-refs: `geometry::parabola_intersect`, `diagram::sweep`.

use crate::diagram::types::{EventId, RegionId, SegmentEnd};
use crate::geometry::{parabola_intersect, Point};

/// Arena index of a beachline node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug)]
pub enum NodeKind {
    /// One site's visible arc.
    Arc {
        region: RegionId,
        event: Option<EventId>,
    },
    /// Meeting point of the arcs of `lower` (previous leaf) and `upper` (next leaf).
    Breakpoint {
        lower: RegionId,
        upper: RegionId,
        end: Option<SegmentEnd>,
        left: NodeId,
        right: NodeId,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct BeachNode {
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// Result of inserting a site into the beachline.
#[derive(Clone, Copy, Debug)]
pub enum Split {
    /// The beachline was empty; the site became the only arc.
    First { leaf: NodeId },
    /// The arc above the site belongs to a site on the directrix (same x). The two
    /// arcs share one breakpoint. `displaced` is the neighbouring breakpoint that now
    /// faces the new arc instead of the old one.
    Pair {
        node: NodeId,
        lower: NodeId,
        upper: NodeId,
        displaced: Option<NodeId>,
    },
    /// Regular split: `left` and `right` are the two halves of the old arc, `middle`
    /// is the new arc. `node` traces (old, new), `inner` traces (new, old).
    Triple {
        node: NodeId,
        inner: NodeId,
        left: NodeId,
        middle: NodeId,
        right: NodeId,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Beachline {
    nodes: Vec<BeachNode>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
}

impl Beachline {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn is_leaf(&self, n: NodeId) -> bool {
        matches!(self.nodes[n.0].kind, NodeKind::Arc { .. })
    }

    /// Region of an arc, or the lower region of a breakpoint.
    pub fn region(&self, n: NodeId) -> RegionId {
        match self.nodes[n.0].kind {
            NodeKind::Arc { region, .. } => region,
            NodeKind::Breakpoint { lower, .. } => lower,
        }
    }

    /// `(lower, upper)` regions of a breakpoint.
    pub fn regions(&self, n: NodeId) -> Option<(RegionId, RegionId)> {
        match self.nodes[n.0].kind {
            NodeKind::Breakpoint { lower, upper, .. } => Some((lower, upper)),
            NodeKind::Arc { .. } => None,
        }
    }

    pub fn event(&self, n: NodeId) -> Option<EventId> {
        match self.nodes[n.0].kind {
            NodeKind::Arc { event, .. } => event,
            NodeKind::Breakpoint { .. } => None,
        }
    }

    pub fn set_event(&mut self, n: NodeId, ev: Option<EventId>) {
        if let NodeKind::Arc { event, .. } = &mut self.nodes[n.0].kind {
            *event = ev;
        }
    }

    pub fn end(&self, n: NodeId) -> Option<SegmentEnd> {
        match self.nodes[n.0].kind {
            NodeKind::Breakpoint { end, .. } => end,
            NodeKind::Arc { .. } => None,
        }
    }

    pub fn set_end(&mut self, n: NodeId, new_end: Option<SegmentEnd>) {
        if let NodeKind::Breakpoint { end, .. } = &mut self.nodes[n.0].kind {
            *end = new_end;
        }
    }

    fn children(&self, n: NodeId) -> Option<(NodeId, NodeId)> {
        match self.nodes[n.0].kind {
            NodeKind::Breakpoint { left, right, .. } => Some((left, right)),
            NodeKind::Arc { .. } => None,
        }
    }

    fn alloc(&mut self, node: BeachNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            id
        } else {
            self.nodes.push(node);
            NodeId(self.nodes.len() - 1)
        }
    }

    fn arc(&mut self, parent: NodeId, region: RegionId, event: Option<EventId>) -> NodeId {
        self.alloc(BeachNode {
            parent: Some(parent),
            kind: NodeKind::Arc { region, event },
        })
    }

    /// Breakpoint position between the arcs around `n` for directrix `x = sweep`.
    pub fn breakpoint_at<F>(&self, n: NodeId, sweep: f64, site: F) -> Option<Point>
    where
        F: Fn(RegionId) -> Point,
    {
        let (lower, upper) = self.regions(n)?;
        parabola_intersect(site(lower), site(upper), sweep)
    }

    /// Insert the arc of `region` below which the sweep at `sweep` just reached its site.
    pub fn break_at<F>(&mut self, sweep: f64, region: RegionId, site: F) -> Split
    where
        F: Fn(RegionId) -> Point,
    {
        let Some(mut n) = self.root else {
            let leaf = self.alloc(BeachNode {
                parent: None,
                kind: NodeKind::Arc {
                    region,
                    event: None,
                },
            });
            self.root = Some(leaf);
            return Split::First { leaf };
        };

        let p = site(region);
        let (old, event) = loop {
            match self.nodes[n.0].kind {
                NodeKind::Arc { region, event } => break (region, event),
                NodeKind::Breakpoint {
                    lower,
                    upper,
                    left,
                    right,
                    ..
                } => {
                    let (fl, fu) = (site(lower), site(upper));
                    let y = parabola_intersect(fl, fu, sweep).map_or(0.5 * (fl.y + fu.y), |q| q.y);
                    n = if p.y < y { left } else { right };
                }
            }
        };

        if site(old).x == p.x {
            let (lo, hi) = if p.y < site(old).y {
                (region, old)
            } else {
                (old, region)
            };
            let displaced = if lo == region {
                let b = self.right(n);
                if let Some(b) = b {
                    if let NodeKind::Breakpoint { upper, .. } = &mut self.nodes[b.0].kind {
                        *upper = region;
                    }
                }
                b
            } else {
                let b = self.left(n);
                if let Some(b) = b {
                    if let NodeKind::Breakpoint { lower, .. } = &mut self.nodes[b.0].kind {
                        *lower = region;
                    }
                }
                b
            };
            let lo_event = if lo == old { event } else { None };
            let hi_event = if hi == old { event } else { None };
            let lower = self.arc(n, lo, lo_event);
            let upper = self.arc(n, hi, hi_event);
            self.nodes[n.0].kind = NodeKind::Breakpoint {
                lower: lo,
                upper: hi,
                end: None,
                left: lower,
                right: upper,
            };
            return Split::Pair {
                node: n,
                lower,
                upper,
                displaced,
            };
        }

        let left = self.arc(n, old, event);
        let inner = self.alloc(BeachNode {
            parent: Some(n),
            kind: NodeKind::Arc {
                region,
                event: None,
            },
        });
        let middle = self.arc(inner, region, None);
        let right = self.arc(inner, old, event);
        self.nodes[inner.0].kind = NodeKind::Breakpoint {
            lower: region,
            upper: old,
            end: None,
            left: middle,
            right,
        };
        self.nodes[n.0].kind = NodeKind::Breakpoint {
            lower: old,
            upper: region,
            end: None,
            left,
            right: inner,
        };
        Split::Triple {
            node: n,
            inner,
            left,
            middle,
            right,
        }
    }

    /// Closest ancestor whose left subtree contains `n` (the breakpoint just above a leaf).
    pub fn left(&self, mut n: NodeId) -> Option<NodeId> {
        while let Some(p) = self.nodes[n.0].parent {
            if matches!(self.children(p), Some((l, _)) if l == n) {
                return Some(p);
            }
            n = p;
        }
        None
    }

    /// Closest ancestor whose right subtree contains `n` (the breakpoint just below a leaf).
    pub fn right(&self, mut n: NodeId) -> Option<NodeId> {
        while let Some(p) = self.nodes[n.0].parent {
            if matches!(self.children(p), Some((_, r)) if r == n) {
                return Some(p);
            }
            n = p;
        }
        None
    }

    /// In-order previous leaf (the arc below).
    pub fn prev(&self, n: NodeId) -> Option<NodeId> {
        let (mut m, _) = self.children(self.right(n)?)?;
        while let Some((_, r)) = self.children(m) {
            m = r;
        }
        Some(m)
    }

    /// In-order next leaf (the arc above).
    pub fn next(&self, n: NodeId) -> Option<NodeId> {
        let (_, mut m) = self.children(self.left(n)?)?;
        while let Some((l, _)) = self.children(m) {
            m = l;
        }
        Some(m)
    }

    /// Remove a squeezed arc. Returns the breakpoint that now separates its two
    /// former neighbours; its regions are updated accordingly.
    ///
    /// `None` if `leaf` has no neighbour on one side (never the case for an arc
    /// removed by a circle event).
    pub fn remove(&mut self, leaf: NodeId) -> Option<NodeId> {
        let p = self.nodes[leaf.0].parent?;
        let (pl, pr) = self.children(p)?;
        let (plower, pupper) = self.regions(p)?;
        let (sibling, merged) = if pl == leaf {
            let a = self.right(leaf)?;
            if let NodeKind::Breakpoint { upper, .. } = &mut self.nodes[a.0].kind {
                *upper = pupper;
            }
            (pr, a)
        } else {
            let a = self.left(leaf)?;
            if let NodeKind::Breakpoint { lower, .. } = &mut self.nodes[a.0].kind {
                *lower = plower;
            }
            (pl, a)
        };

        let gp = self.nodes[p.0].parent?;
        if let NodeKind::Breakpoint { left, right, .. } = &mut self.nodes[gp.0].kind {
            if *left == p {
                *left = sibling;
            } else {
                *right = sibling;
            }
        }
        self.nodes[sibling.0].parent = Some(gp);
        self.free.push(leaf);
        self.free.push(p);
        Some(merged)
    }

    /// Leaves in bottom-to-top order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(n) = cur {
                stack.push(n);
                cur = self.children(n).map(|(l, _)| l);
            }
            let Some(n) = stack.pop() else {
                break;
            };
            match self.children(n) {
                Some((_, r)) => cur = Some(r),
                None => out.push(n),
            }
        }
        out
    }

    /// Breakpoints in pre-order.
    pub fn breakpoints(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(n) = stack.pop() {
            if let Some((l, r)) = self.children(n) {
                out.push(n);
                stack.push(r);
                stack.push(l);
            }
        }
        out
    }

    /// Checks the structural invariants: parent links, breakpoint regions matching
    /// the neighbouring leaves, and no two adjacent leaves on the same region.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        let Some(root) = self.root else {
            return Ok(());
        };
        if self.nodes[root.0].parent.is_some() {
            return Err("root has a parent".into());
        }
        for n in self.breakpoints() {
            let (l, r) = self.children(n).ok_or("breakpoint without children")?;
            for c in [l, r] {
                if self.nodes[c.0].parent != Some(n) {
                    return Err(format!("broken parent link at {c:?}"));
                }
            }
        }
        let leaves = self.leaves();
        for w in leaves.windows(2) {
            if self.region(w[0]) == self.region(w[1]) {
                return Err(format!("adjacent leaves share {:?}", self.region(w[0])));
            }
        }
        for &leaf in &leaves {
            if let Some(b) = self.left(leaf) {
                let (lower, upper) = self.regions(b).ok_or("left() is not a breakpoint")?;
                let next = self.next(leaf).ok_or("missing next leaf")?;
                if lower != self.region(leaf) || upper != self.region(next) {
                    return Err(format!("breakpoint {b:?} disagrees with its leaves"));
                }
            }
        }
        Ok(())
    }
}
