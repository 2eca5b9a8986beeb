//! JSON payloads shaped like the API's responses.

use serde_json::{json, Value};

/// A suggestion in Sfax, with a location unless `located` is false.
pub fn suggestion(id: i64, status: &str, confirmations: u32, located: bool) -> Value {
    let mut s = json!({
        "id": id,
        "arabic_name": format!("مسجد {}", id),
        "type": "masjid",
        "governorate": "Sfax",
        "city": "Sfax Ville",
        "facilities": { "wudu": true, "women_section": false },
        "iqama_times": { "fajr": 20, "isha": 10 },
        "status": status,
        "confirmations_count": confirmations,
        "created_at": "2025-03-01T10:00:00Z"
    });
    if located {
        s["latitude"] = json!(34.7406);
        s["longitude"] = json!(10.7603);
    }
    s
}

pub fn review(id: i64, status: &str, rating: i64) -> Value {
    json!({
        "id": id,
        "mosque_id": 1,
        "rating": rating,
        "comment": "Clean and quiet",
        "criteria": { "cleanliness": 5, "parking": 3 },
        "status": status,
        "created_at": "2025-03-02T18:30:00Z"
    })
}

pub fn edit(id: i64, status: &str, confirmations: u32) -> Value {
    json!({
        "id": id,
        "mosque_id": 1,
        "patch": { "jumuah_time": "12:45", "muazzin_name": "Sami" },
        "confirmations_count": confirmations,
        "status": status
    })
}

pub fn mosque(id: i64, governorate: &str) -> Value {
    json!({
        "id": id,
        "arabic_name": "جامع الزيتونة",
        "type": "جامع",
        "governorate": governorate,
        "city": "Tunis",
        "latitude": 36.7975,
        "longitude": 10.1712,
        "facilities": { "ac": true },
        "iqama_times": { "dhuhr": "13:00" },
        "jumuah_time": "12:30"
    })
}
