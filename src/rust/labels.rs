use std::collections::BTreeMap;
use lazy_static::lazy_static;

/// Number of classes in the GTSRB taxonomy.
pub const NUM_CLASSES: usize = 43;

/// GTSRB class names, indexed by class id.
pub const LABELS: [&str; NUM_CLASSES] = [
    "Speed limit (20km/h)",
    "Speed limit (30km/h)",
    "Speed limit (50km/h)",
    "Speed limit (60km/h)",
    "Speed limit (70km/h)",
    "Speed limit (80km/h)",
    "End of speed limit (80km/h)",
    "Speed limit (100km/h)",
    "Speed limit (120km/h)",
    "No passing",
    "No passing for vehicles over 3.5 metric tons",
    "Right-of-way at the next intersection",
    "Priority road",
    "Yield",
    "Stop",
    "No vehicles",
    "Vehicles over 3.5 metric tons prohibited",
    "No entry",
    "General caution",
    "Dangerous curve to the left",
    "Dangerous curve to the right",
    "Double curve",
    "Bumpy road",
    "Slippery road",
    "Road narrows on the right",
    "Road work",
    "Traffic signals",
    "Pedestrians",
    "Children crossing",
    "Bicycles crossing",
    "Beware of ice/snow",
    "Wild animals crossing",
    "End of all speed and passing limits",
    "Turn right ahead",
    "Turn left ahead",
    "Ahead only",
    "Go straight or right",
    "Go straight or left",
    "Keep right",
    "Keep left",
    "Roundabout mandatory",
    "End of no passing",
    "End of no passing by vehicles over 3.5 metric tons",
];

lazy_static! {
    static ref LABEL_MAP: BTreeMap<usize, &'static str> = LABELS
        .iter()
        .enumerate()
        .map(|(id, name)| (id, *name))
        .collect();
}

/// Returns the human-readable name for a class id.
///
/// Ids outside the table come back as `"Unknown Class <id>"` so a model with
/// more outputs than labels still produces a usable response.
pub fn label_for(class_id: usize) -> String {
    LABELS
        .get(class_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown Class {}", class_id))
}

/// The full id-to-name table in ascending id order.
pub fn label_map() -> &'static BTreeMap<usize, &'static str> {
    &LABEL_MAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_table_size() {
        assert_eq!(LABELS.len(), 43);
        assert_eq!(label_map().len(), 43);
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(label_for(0), "Speed limit (20km/h)");
        assert_eq!(label_for(14), "Stop");
        assert_eq!(label_for(42), "End of no passing by vehicles over 3.5 metric tons");
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(label_for(43), "Unknown Class 43");
        assert_eq!(label_for(1000), "Unknown Class 1000");
    }

    #[test]
    fn test_label_map_order() {
        let ids: Vec<usize> = label_map().keys().cloned().collect();
        assert_eq!(ids, (0..NUM_CLASSES).collect::<Vec<_>>());
    }
}
