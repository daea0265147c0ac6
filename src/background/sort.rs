//! Stable top-down merge sort of a key slice with a companion payload slice.

/// Sort `keys` ascending and apply the same permutation to `values`.
///
/// Equal keys keep their original relative order. `key_buf` and `value_buf`
/// are caller-provided scratch of at least `keys.len()` elements so the hot
/// per-pixel loop does not allocate.
pub fn merge_sort_pairs<K, V>(keys: &mut [K], values: &mut [V], key_buf: &mut [K], value_buf: &mut [V])
where
    K: Copy + PartialOrd,
    V: Copy,
{
    let n = keys.len();
    debug_assert_eq!(n, values.len());
    match n {
        0 | 1 => return,
        2 => {
            if keys[0] > keys[1] {
                keys.swap(0, 1);
                values.swap(0, 1);
            }
            return;
        }
        _ => {}
    }

    let half = n / 2;
    {
        let (k0, k1) = keys.split_at_mut(half);
        let (v0, v1) = values.split_at_mut(half);
        let (kb0, kb1) = key_buf[..n].split_at_mut(half);
        let (vb0, vb1) = value_buf[..n].split_at_mut(half);
        merge_sort_pairs(k0, v0, kb0, vb0);
        merge_sort_pairs(k1, v1, kb1, vb1);
    }

    key_buf[..n].copy_from_slice(keys);
    value_buf[..n].copy_from_slice(values);

    let (mut p0, mut p1) = (0, half);
    for i in 0..n {
        let take_left = p1 >= n || (p0 < half && key_buf[p0] <= key_buf[p1]);
        let src = if take_left {
            p0 += 1;
            p0 - 1
        } else {
            p1 += 1;
            p1 - 1
        };
        keys[i] = key_buf[src];
        values[i] = value_buf[src];
    }
}
