use rand::Rng;

/// Anything that can be drawn with probability proportional to a weight
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Negative and non-finite weights count as zero
fn effective_weight<T: Weighted>(item: &T) -> f64 {
    let w = item.weight();
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}

/// Pick one item with probability `weight / total`.
///
/// Returns `None` when `items` is empty, every weight is zero, or the weights
/// sum past `f64::MAX`. A single uniform draw in `[0, total)` is matched
/// against the running sum, so an item with zero weight can never be chosen.
pub fn pick_weighted<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let total: f64 = items.iter().map(effective_weight).sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let draw = rng.gen_range(0.0..total);
    let mut running = 0.0;
    for item in items {
        let w = effective_weight(item);
        if w == 0.0 {
            continue;
        }
        running += w;
        if draw < running {
            return Some(item);
        }
    }

    // Float rounding can leave `running` a hair below `draw`
    items.iter().rev().find(|item| effective_weight(*item) > 0.0)
}
