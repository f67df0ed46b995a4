use super::normalizer::{normalize_header, normalize_text};
use super::record::{ProductRecord, RawField};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ProductRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect::<csv::StringRecord>();
    csv_reader.set_headers(headers);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        records.push(row?.into_record(index + 1));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    vendor: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    model: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    season: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    width: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    profile: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rim_size: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    noise_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    wet_grip: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fuel_efficiency: Option<String>,
    #[serde(
        default,
        alias = "user_rating",
        deserialize_with = "empty_string_as_none"
    )]
    dex_rating: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    url: Option<String>,
}

impl CatalogRow {
    fn into_record(self, row_number: usize) -> ProductRecord {
        let text = |value: Option<String>| value.map(|raw| normalize_text(&raw));
        let raw = |value: Option<String>| value.map(RawField::Text);

        ProductRecord {
            id: self.id.unwrap_or_else(|| row_number.to_string()),
            vendor: text(self.vendor),
            brand: text(self.brand),
            model: text(self.model),
            season: self.season,
            width: raw(self.width),
            profile: raw(self.profile),
            rim_size: raw(self.rim_size),
            price: raw(self.price),
            noise_level: raw(self.noise_level),
            wet_grip: self.wet_grip,
            fuel_efficiency: self.fuel_efficiency,
            user_rating: raw(self.dex_rating),
            url: self.url,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
