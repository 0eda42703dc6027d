//! Canned weather lookup
//!
//! No upstream service is queried; a fixed table covers four cities, matched by
//! English name (any case) or Chinese name.

use super::ToolResult;

struct CityWeather {
    english: &'static str,
    chinese: &'static str,
    report: &'static str,
}

const WEATHER_TABLE: &[CityWeather] = &[
    CityWeather {
        english: "Beijing",
        chinese: "北京",
        report: "Sunny, 15-25°C",
    },
    CityWeather {
        english: "Shanghai",
        chinese: "上海",
        report: "Cloudy, 18-28°C",
    },
    CityWeather {
        english: "Guangzhou",
        chinese: "广州",
        report: "Light rain, 20-30°C",
    },
    CityWeather {
        english: "Shenzhen",
        chinese: "深圳",
        report: "Sunny, 22-32°C",
    },
];

pub fn search_weather(city: &str) -> ToolResult {
    let city = city.trim();
    let found = WEATHER_TABLE
        .iter()
        .find(|entry| entry.chinese == city || entry.english.eq_ignore_ascii_case(city));

    match found {
        Some(entry) => ToolResult::success(format!("{}: {}", entry.english, entry.report)),
        // Not an error: the model should relay the fallback to the user
        None => ToolResult::success(format!(
            "Sorry, weather information for {} is not available right now",
            city
        )),
    }
}
