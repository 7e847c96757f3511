use crate::flops;

/// One level of the sparse coefficient tree.
///
/// A node at level `l` stores one slot per power of variable `l`. At level 0
/// the slots are the raw coefficients (`Leaf`), above that each slot owns the
/// sub-polynomial in the remaining lower variables (`Internal`). An absent
/// child is an implicit zero. Outside of a mutating call the last slot of
/// every node is non-zero (leaf) or present (internal); [`CoeffNode::prune`]
/// restores that after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CoeffNode {
    Leaf(Vec<f64>),
    Internal(Vec<Option<Box<CoeffNode>>>),
}

/// Extends `v` with `fill` up to `len` slots, at least doubling the
/// allocation whenever it has to grow.
fn grow_vec<T: Clone>(v: &mut Vec<T>, len: usize, fill: T) {
    if len > v.len() {
        if len > v.capacity() {
            let target = len.max(2 * v.capacity());
            v.reserve(target - v.len());
        }
        v.resize(len, fill);
    }
}

/// Evaluates the coefficients at `x` by Horner's rule.
pub(crate) fn horner(coeffs: &[f64], x: f64) -> f64 {
    flops::add(2 * coeffs.len() as u64);
    coeffs.iter().rev().fold(0.0, |acc, &c| x.mul_add(acc, c))
}

/// Evaluates value and first derivative at `x` in a single pass.
pub(crate) fn horner_with_derivative(coeffs: &[f64], x: f64) -> (f64, f64) {
    flops::add(4 * coeffs.len() as u64);
    let mut value = 0.0;
    let mut derivative = 0.0;
    for &c in coeffs.iter().rev() {
        derivative = x.mul_add(derivative, value);
        value = x.mul_add(value, c);
    }
    (value, derivative)
}

/// Evaluates `(p(a) - p(b), p(a))`.
///
/// The difference is accumulated through the factorization
/// `p(a) - p(b) = (a - b) * q(a, b)` instead of being formed from two
/// separately rounded evaluations, so nearby `a` and `b` do not cancel.
pub(crate) fn horner_diff(coeffs: &[f64], a: f64, b: f64) -> (f64, f64) {
    let mut iter = coeffs.iter().rev();
    let Some(&leading) = iter.next() else {
        return (0.0, 0.0);
    };
    let mut value_a = leading;
    let mut quotient = 0.0;
    for &c in iter {
        quotient = b.mul_add(quotient, value_a);
        value_a = a.mul_add(value_a, c);
    }
    flops::add(4 * coeffs.len() as u64);
    ((a - b) * quotient, value_a)
}

impl CoeffNode {
    /// An empty node of the variant matching `level`.
    pub(crate) fn new_level(level: usize) -> CoeffNode {
        if level == 0 {
            CoeffNode::Leaf(Vec::new())
        } else {
            CoeffNode::Internal(Vec::new())
        }
    }

    /// Reads the coefficient at `pows`; absent slots read as zero.
    pub(crate) fn get(&self, pows: &[usize], level: usize) -> f64 {
        match self {
            CoeffNode::Leaf(coeffs) => coeffs.get(pows[0]).copied().unwrap_or(0.0),
            CoeffNode::Internal(children) => children
                .get(pows[level])
                .and_then(|child| child.as_deref())
                .map_or(0.0, |child| child.get(pows, level - 1)),
        }
    }

    /// Writes a non-zero coefficient at `pows`, growing slots and creating
    /// children along the path as needed.
    pub(crate) fn set(&mut self, pows: &[usize], level: usize, value: f64) {
        match self {
            CoeffNode::Leaf(coeffs) => {
                grow_vec(coeffs, pows[0] + 1, 0.0);
                coeffs[pows[0]] = value;
            }
            CoeffNode::Internal(children) => {
                grow_vec(children, pows[level] + 1, None);
                let child = children[pows[level]]
                    .get_or_insert_with(|| Box::new(CoeffNode::new_level(level - 1)));
                child.set(pows, level - 1, value);
            }
        }
    }

    /// Zeroes the coefficient at `pows` without allocating missing slots.
    pub(crate) fn clear(&mut self, pows: &[usize], level: usize) {
        match self {
            CoeffNode::Leaf(coeffs) => {
                if let Some(slot) = coeffs.get_mut(pows[0]) {
                    *slot = 0.0;
                }
            }
            CoeffNode::Internal(children) => {
                if let Some(Some(child)) = children.get_mut(pows[level]) {
                    child.clear(pows, level - 1);
                }
            }
        }
    }

    /// Discards empty subtrees and trailing zero slots, restoring the sparse
    /// invariant. Returns true when the node itself became empty.
    ///
    /// Zero means exactly `0.0` here. Structural cancellation produces exact
    /// zeros, while near-zero rounding residue is kept.
    pub(crate) fn prune(&mut self) -> bool {
        match self {
            CoeffNode::Leaf(coeffs) => {
                while coeffs.last() == Some(&0.0) {
                    coeffs.pop();
                }
                coeffs.is_empty()
            }
            CoeffNode::Internal(children) => {
                for child in children.iter_mut() {
                    if let Some(node) = child {
                        if node.prune() {
                            *child = None;
                        }
                    }
                }
                while matches!(children.last(), Some(None)) {
                    children.pop();
                }
                children.is_empty()
            }
        }
    }

    /// Highest exponent sum among non-zero coefficients. Call on pruned
    /// trees only, where the leading slot of every node is live.
    pub(crate) fn total_degree(&self) -> usize {
        match self {
            CoeffNode::Leaf(coeffs) => coeffs.len().saturating_sub(1),
            CoeffNode::Internal(children) => children
                .iter()
                .enumerate()
                .filter_map(|(i, child)| child.as_deref().map(|c| i + c.total_degree()))
                .max()
                .unwrap_or(0),
        }
    }

    /// Number of non-zero coefficients in the subtree.
    pub(crate) fn term_count(&self) -> usize {
        match self {
            CoeffNode::Leaf(coeffs) => coeffs.iter().filter(|&&v| v != 0.0).count(),
            CoeffNode::Internal(children) => {
                children.iter().flatten().map(|c| c.term_count()).sum()
            }
        }
    }

    /// Coefficient of the all-zero power vector.
    pub(crate) fn constant_term(&self) -> f64 {
        match self {
            CoeffNode::Leaf(coeffs) => coeffs.first().copied().unwrap_or(0.0),
            CoeffNode::Internal(children) => children
                .first()
                .and_then(|child| child.as_deref())
                .map_or(0.0, |child| child.constant_term()),
        }
    }

    /// Visits every non-zero coefficient with its power vector. `pows` is a
    /// caller-owned scratch buffer of the polynomial's dimension; each visit
    /// sees the full path freshly written.
    pub(crate) fn walk<F>(&self, pows: &mut Vec<usize>, level: usize, visit: &mut F)
    where
        F: FnMut(&[usize], f64),
    {
        match self {
            CoeffNode::Leaf(coeffs) => {
                for (i, &value) in coeffs.iter().enumerate() {
                    if value != 0.0 {
                        pows[0] = i;
                        visit(pows, value);
                    }
                }
            }
            CoeffNode::Internal(children) => {
                for (i, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        pows[level] = i;
                        child.walk(pows, level - 1, visit);
                    }
                }
            }
        }
    }

    /// True when every coefficient in the subtree is within `tolerance` of
    /// zero in absolute value.
    fn all_within(&self, tolerance: f64) -> bool {
        match self {
            CoeffNode::Leaf(coeffs) => coeffs.iter().all(|v| v.abs() <= tolerance),
            CoeffNode::Internal(children) => {
                children.iter().flatten().all(|c| c.all_within(tolerance))
            }
        }
    }

    /// Multiplies every coefficient in the subtree by `factor`.
    pub(crate) fn scale(&mut self, factor: f64) {
        match self {
            CoeffNode::Leaf(coeffs) => {
                for value in coeffs.iter_mut() {
                    *value *= factor;
                }
                flops::add(coeffs.len() as u64);
            }
            CoeffNode::Internal(children) => {
                for child in children.iter_mut().flatten() {
                    child.scale(factor);
                }
            }
        }
    }

    /// Adds `factor` times `src` into `self`, displaced by `offset[l]` slots
    /// at each level `l`. With a zero offset this is a plain scaled merge;
    /// with the power vector of a monomial it is one partial product of a
    /// polynomial multiplication.
    pub(crate) fn accumulate_scaled(
        &mut self,
        src: &CoeffNode,
        offset: &[usize],
        level: usize,
        factor: f64,
    ) {
        match (self, src) {
            (CoeffNode::Leaf(dst), CoeffNode::Leaf(coeffs)) => {
                grow_vec(dst, offset[0] + coeffs.len(), 0.0);
                for (i, &value) in coeffs.iter().enumerate() {
                    if value != 0.0 {
                        dst[offset[0] + i] += factor * value;
                        flops::add(2);
                    }
                }
            }
            (CoeffNode::Internal(dst), CoeffNode::Internal(children)) => {
                grow_vec(dst, offset[level] + children.len(), None);
                for (i, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        let slot = dst[offset[level] + i]
                            .get_or_insert_with(|| Box::new(CoeffNode::new_level(level - 1)));
                        slot.accumulate_scaled(child, offset, level - 1, factor);
                    }
                }
            }
            _ => unreachable!("node depth differs between operands"),
        }
    }

    /// Differentiates the subtree with respect to variable `var` in place.
    /// Returns true when the subtree vanished.
    pub(crate) fn derivative(&mut self, var: usize, level: usize) -> bool {
        match self {
            CoeffNode::Leaf(coeffs) => {
                if coeffs.len() <= 1 {
                    coeffs.clear();
                    return true;
                }
                for i in 1..coeffs.len() {
                    coeffs[i - 1] = coeffs[i] * i as f64;
                }
                flops::add(coeffs.len() as u64 - 1);
                coeffs.pop();
                false
            }
            CoeffNode::Internal(children) => {
                if level == var {
                    if children.len() <= 1 {
                        children.clear();
                        return true;
                    }
                    children.remove(0);
                    for (i, child) in children.iter_mut().enumerate() {
                        if let Some(child) = child {
                            child.scale((i + 1) as f64);
                        }
                    }
                    false
                } else {
                    for child in children.iter_mut() {
                        if let Some(node) = child {
                            if node.derivative(var, level - 1) {
                                *child = None;
                            }
                        }
                    }
                    while matches!(children.last(), Some(None)) {
                        children.pop();
                    }
                    children.is_empty()
                }
            }
        }
    }

    /// Replaces `p(.., x_var, ..)` by `p(.., x_var + u, ..)` in place via the
    /// in-place binomial recurrence applied along the `var` level. `zeros` is
    /// an all-zero offset vector covering the tree depth.
    pub(crate) fn shift(&mut self, var: usize, level: usize, u: f64, zeros: &[usize]) {
        match self {
            CoeffNode::Leaf(coeffs) => {
                let n = coeffs.len();
                for j in 0..n.saturating_sub(1) {
                    for i in (j..n - 1).rev() {
                        coeffs[i] = u.mul_add(coeffs[i + 1], coeffs[i]);
                    }
                }
                if n > 1 {
                    flops::add((n * (n - 1)) as u64);
                }
            }
            CoeffNode::Internal(children) => {
                if level == var {
                    let n = children.len();
                    for j in 0..n.saturating_sub(1) {
                        for i in (j..n - 1).rev() {
                            let (low, high) = children.split_at_mut(i + 1);
                            if let Some(src) = high[0].as_deref() {
                                let dst = low[i].get_or_insert_with(|| {
                                    Box::new(CoeffNode::new_level(level - 1))
                                });
                                dst.accumulate_scaled(src, zeros, level - 1, u);
                            }
                        }
                    }
                } else {
                    for child in children.iter_mut().flatten() {
                        child.shift(var, level - 1, u, zeros);
                    }
                }
            }
        }
    }

    /// Collapses variable `var` to the constant `c`, producing the tree of a
    /// polynomial with one variable less. The `var` level folds into the
    /// level below by Horner's rule; levels above are rebuilt around the
    /// collapsed children. Returns `None` when the result is empty before
    /// pruning.
    pub(crate) fn extract(
        &self,
        var: usize,
        level: usize,
        c: f64,
        zeros: &[usize],
    ) -> Option<CoeffNode> {
        match self {
            CoeffNode::Internal(children) => {
                if level == var {
                    let mut acc: Option<CoeffNode> = None;
                    for child in children.iter().rev() {
                        if let Some(node) = acc.as_mut() {
                            node.scale(c);
                        }
                        if let Some(child) = child {
                            acc.get_or_insert_with(|| CoeffNode::new_level(level - 1))
                                .accumulate_scaled(child, zeros, level - 1, 1.0);
                        }
                    }
                    acc
                } else if var == 0 && level == 1 {
                    let mut leaf = vec![0.0; children.len()];
                    for (i, child) in children.iter().enumerate() {
                        match child.as_deref() {
                            Some(CoeffNode::Leaf(coeffs)) => leaf[i] = horner(coeffs, c),
                            Some(CoeffNode::Internal(_)) => {
                                unreachable!("node depth differs from level")
                            }
                            None => {}
                        }
                    }
                    Some(CoeffNode::Leaf(leaf))
                } else {
                    let collapsed = children
                        .iter()
                        .map(|child| {
                            child
                                .as_deref()
                                .and_then(|c_node| c_node.extract(var, level - 1, c, zeros))
                                .map(Box::new)
                        })
                        .collect();
                    Some(CoeffNode::Internal(collapsed))
                }
            }
            CoeffNode::Leaf(_) => unreachable!("extraction stops above the leaf level"),
        }
    }

    /// Evaluates the subtree at `point` by Horner's rule, highest variable
    /// first. Absent children contribute zero without being descended.
    pub(crate) fn eval(&self, point: &[f64], level: usize) -> f64 {
        match self {
            CoeffNode::Leaf(coeffs) => horner(coeffs, point[0]),
            CoeffNode::Internal(children) => {
                let x = point[level];
                flops::add(2 * children.len() as u64);
                children.iter().rev().fold(0.0, |acc, child| {
                    let inner = child.as_deref().map_or(0.0, |c| c.eval(point, level - 1));
                    x.mul_add(acc, inner)
                })
            }
        }
    }
}

/// Tolerance comparison of two optional subtrees, slot by slot with implicit
/// zeros on either side.
pub(crate) fn approx_eq_nodes(a: Option<&CoeffNode>, b: Option<&CoeffNode>, tolerance: f64) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(node), None) | (None, Some(node)) => node.all_within(tolerance),
        (Some(CoeffNode::Leaf(ca)), Some(CoeffNode::Leaf(cb))) => {
            let n = ca.len().max(cb.len());
            (0..n).all(|i| {
                let va = ca.get(i).copied().unwrap_or(0.0);
                let vb = cb.get(i).copied().unwrap_or(0.0);
                (va - vb).abs() <= tolerance
            })
        }
        (Some(CoeffNode::Internal(ca)), Some(CoeffNode::Internal(cb))) => {
            let n = ca.len().max(cb.len());
            (0..n).all(|i| {
                let na = ca.get(i).and_then(|c| c.as_deref());
                let nb = cb.get(i).and_then(|c| c.as_deref());
                approx_eq_nodes(na, nb, tolerance)
            })
        }
        _ => false,
    }
}
