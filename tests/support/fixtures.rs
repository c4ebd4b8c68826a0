//! JSON payloads shaped like delivery API responses.

use serde_json::{Value, json};

pub const PROJECT_ID: &str = "975bf280-fd91-488c-994c-2f04416e5ee3";

pub fn system(codename: &str, content_type: &str) -> Value {
    json!({
        "id": format!("{codename}-id"),
        "name": codename,
        "codename": codename,
        "language": "en",
        "type": content_type,
        "collection": "default",
        "last_modified": "2019-03-27T13:21:11.38Z",
        "sitemap_locations": []
    })
}

pub fn movie(codename: &str, title: &str, stars: &[&str]) -> Value {
    json!({
        "system": system(codename, "movie"),
        "elements": {
            "title": {"type": "text", "name": "Title", "value": title},
            "length": {"type": "number", "name": "Length", "value": 140},
            "released": {"type": "date_time", "name": "Released", "value": "2011-09-09T00:00:00Z"},
            "stars": {"type": "modular_content", "name": "Stars", "value": stars},
            "url": {"type": "url_slug", "name": "URL", "value": codename}
        }
    })
}

pub fn actor(codename: &str, first_name: &str, movies: &[&str]) -> Value {
    json!({
        "system": system(codename, "actor"),
        "elements": {
            "first_name": {"type": "text", "name": "First name", "value": first_name},
            "movies": {"type": "modular_content", "name": "Movies", "value": movies}
        }
    })
}

/// A movie whose `plot` rich text embeds `linked` and links to `warrior`.
pub fn movie_with_plot(codename: &str, linked: &str) -> Value {
    let html = format!(
        "<p>Starring <object type=\"application/kenticocloud\" data-type=\"item\" data-rel=\"link\" data-codename=\"{linked}\"></object></p>\
         <p>See <a data-item-id=\"link-1\" href=\"\">Warrior</a></p>\
         <figure><img src=\"\" data-image-id=\"img-1\"></figure>"
    );
    json!({
        "system": system(codename, "movie"),
        "elements": {
            "title": {"type": "text", "name": "Title", "value": codename},
            "plot": {
                "type": "rich_text",
                "name": "Plot",
                "value": html,
                "modular_content": [linked],
                "images": {
                    "img-1": {
                        "image_id": "img-1",
                        "description": "Poster",
                        "url": "https://assets.example.com/poster.jpg",
                        "width": 800,
                        "height": 600
                    }
                },
                "links": {
                    "link-1": {"codename": "warrior", "type": "movie", "url_slug": "warrior"}
                }
            }
        }
    })
}

pub fn item_response(item: Value, linked: &[Value]) -> Value {
    json!({"item": item, "modular_content": modular_content(linked)})
}

pub fn listing_response(items: &[Value], linked: &[Value]) -> Value {
    json!({
        "items": items,
        "modular_content": modular_content(linked),
        "pagination": {
            "skip": 0,
            "limit": items.len(),
            "count": items.len(),
            "next_page": ""
        }
    })
}

fn modular_content(linked: &[Value]) -> Value {
    let map: serde_json::Map<String, Value> = linked
        .iter()
        .map(|item| {
            let codename = item["system"]["codename"].as_str().unwrap_or_default().to_string();
            (codename, item.clone())
        })
        .collect();
    Value::Object(map)
}
