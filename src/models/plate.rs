//! License plate format check.
//!
//! Accepted plates are dash-separated digit groups in one of three shapes:
//! `123-45-678`, `123-456-789` or `12-345-67`.

const GROUP_SHAPES: [&[usize]; 3] = [&[3, 2, 3], &[3, 3, 3], &[2, 3, 2]];

pub fn is_valid(plate: &str) -> bool {
    let groups: Vec<&str> = plate.split('-').collect();

    GROUP_SHAPES.iter().any(|shape| {
        groups.len() == shape.len()
            && groups
                .iter()
                .zip(shape.iter())
                .all(|(group, len)| group.len() == *len && group.bytes().all(|b| b.is_ascii_digit()))
    })
}
