//! Shared catalog fixtures for compiler and executor tests: a small
//! book/author/series schema with the domain allow-lists the search surface
//! exposes, plus record sets matching the documented scenarios.

use crate::{
    exec::Record,
    schema::{EntityDef, EnumDef, FieldMapper, FieldType, Schema},
    value::Value,
};
use chrono::NaiveDate;

pub(crate) fn catalog_schema() -> Schema {
    let genre = FieldType::Enum(
        EnumDef::new("Genre", ["FANTASY", "SCIFI", "MYSTERY"]).expect("constants are distinct"),
    );

    let book = EntityDef::builder("Book")
        .field("title", FieldType::Text)
        .field("description", FieldType::Text)
        .field("published", FieldType::Date)
        .field("pages", FieldType::Int)
        .field("rating", FieldType::Double)
        .field("available", FieldType::Bool)
        .field("genre", genre)
        .to_many("authors", "Author")
        .to_one("series", "Series")
        .build()
        .expect("valid entity");

    let author = EntityDef::builder("Author")
        .field("firstName", FieldType::Text)
        .field("lastName", FieldType::Text)
        .field("bio", FieldType::Text)
        .build()
        .expect("valid entity");

    let series = EntityDef::builder("Series")
        .field("name", FieldType::Text)
        .field("volume", FieldType::Int)
        .build()
        .expect("valid entity");

    Schema::builder()
        .entity(book)
        .entity(author)
        .entity(series)
        .build()
        .expect("valid schema")
}

pub(crate) fn book_mapper() -> FieldMapper {
    FieldMapper::builder("Book")
        .simple("title", "title")
        .simple("description", "description")
        .simple("published", "published")
        .simple("pages", "pages")
        .simple("rating", "rating")
        .simple("available", "available")
        .simple("genre", "genre")
        .simple("authors.firstName", "authors.firstName")
        .simple("authors.lastName", "authors.lastName")
        .composite("author.name", ["authors.firstName", "authors.lastName"], " ")
        .composite("authors.name", ["authors.firstName", "authors.lastName"], " ")
        .simple("author.bio", "authors.bio")
        .simple("author.description", "authors.bio")
        .simple("series.name", "series.name")
        .simple("series.volume", "series.volume")
        .build()
        .expect("valid mapper")
}

pub(crate) fn author_mapper() -> FieldMapper {
    FieldMapper::builder("Author")
        .simple("firstName", "firstName")
        .simple("lastName", "lastName")
        .simple("bio", "bio")
        .composite("name", ["firstName", "lastName"], " ")
        .build()
        .expect("valid mapper")
}

fn author(first: &str, last: &str, bio: &str) -> Record {
    Record::new()
        .field("firstName", Value::Text(first.into()))
        .field("lastName", Value::Text(last.into()))
        .field("bio", Value::Text(bio.into()))
}

fn date(year: i32, month: u32, day: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date"))
}

pub(crate) fn authors() -> Vec<Record> {
    vec![
        author("John", "Doe", "Walks a lot."),
        author("Jane", "Smith", "Writes about stone."),
    ]
}

pub(crate) fn books() -> Vec<Record> {
    vec![
        Record::new()
            .field("title", Value::Text("The Long Walk".into()))
            .field("description", Value::Null)
            .field("published", date(2019, 3, 14))
            .field("pages", Value::Int(412))
            .field("rating", Value::Double(4.1))
            .field("available", Value::Bool(true))
            .field("genre", Value::Enum("FANTASY".into()))
            .relation(
                "authors",
                vec![
                    author("John", "Doe", "Walks a lot."),
                    author("Jane", "Smith", "Writes about stone."),
                ],
            ),
        Record::new()
            .field("title", Value::Text("Salt and Stone".into()))
            .field("description", Value::Text("A coastal history.".into()))
            .field("published", date(2021, 9, 2))
            .field("pages", Value::Int(288))
            .field("rating", Value::Double(3.7))
            .field("available", Value::Bool(false))
            .field("genre", Value::Enum("MYSTERY".into()))
            .relation(
                "authors",
                vec![
                    author("Jane", "Smith", "Writes about stone."),
                    author("Don", "Quill", "Short bios only."),
                ],
            )
            .relation(
                "series",
                vec![Record::new()
                    .field("name", Value::Text("Tidelands".into()))
                    .field("volume", Value::Int(2))],
            ),
        Record::new()
            .field("title", Value::Text("Harbor Lights".into()))
            .field("description", Value::Text("Ships at night.".into()))
            .field("published", date(2023, 1, 30))
            .field("pages", Value::Int(199))
            .field("rating", Value::Double(4.8))
            .field("available", Value::Bool(true))
            .field("genre", Value::Enum("SCIFI".into()))
            .relation("authors", vec![author("JANE", "DOE", "All caps, by choice.")])
            .relation(
                "series",
                vec![Record::new()
                    .field("name", Value::Text("Harbor".into()))
                    .field("volume", Value::Int(7))],
            ),
    ]
}
