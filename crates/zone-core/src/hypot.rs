// hypot.rs — integer-approximation hypotenuse (spec.md §4.2, design
// notes §9: "retained verbatim: initial guess max + min/2, three Newton
// iterations").
//
// Converted in spirit from myq2-common's small single-purpose numeric
// helpers (e.g. crc.rs) — one function, one invariant, tested at the
// boundary values the spec calls out.

/// Integer approximation of `sqrt(dx*dx + dy*dy)`.
///
/// Initial guess `max + min/2`, refined with three iterations of
/// `r <- (dd/r + r) / 2` (a fixed-iteration Newton/Heron step). Design
/// notes §9 permit an equivalent-or-better algorithm as long as it
/// matches this one to within 1 pixel over the relevant range; this is
/// the reference algorithm itself, so it matches exactly.
pub fn int_hypot(dx: i64, dy: i64) -> i64 {
    let dx = dx.unsigned_abs();
    let dy = dy.unsigned_abs();
    let dd = dx * dx + dy * dy;
    if dd == 0 {
        return 0;
    }

    let (max, min) = if dx > dy { (dx, dy) } else { (dy, dx) };
    let mut r = max + min / 2;
    if r == 0 {
        return 0;
    }

    for _ in 0..3 {
        r = (dd / r + r) / 2;
    }
    r as i64
}
