use super::session_client;
use crate::{
    api::Id,
    conf::Conf,
    execution::DEFAULT_PAGE_SIZE,
    place::{LeadsView, PlaceRecord, PlaceStatus, PlaceStore},
    Result,
};
use serde_json::Value;
use std::str::FromStr;
use tracing::info;

pub async fn list(page_index: u64, conf: &Conf) -> Result<()> {
    let mut view = LeadsView::new(session_client(conf)?, DEFAULT_PAGE_SIZE);
    view.load(page_index).await?;
    print_page(&view);
    Ok(())
}

pub async fn show(id: &Id, conf: &Conf) -> Result<()> {
    let place = session_client(conf)?.place(id).await?;
    println!("{}", serde_json::to_string_pretty(&place)?);
    Ok(())
}

pub async fn set_status(
    id: &Id,
    status: PlaceStatus,
    page_index: Option<u64>,
    conf: &Conf,
) -> Result<()> {
    let mut view = LeadsView::new(session_client(conf)?, DEFAULT_PAGE_SIZE);
    change_status(&mut view, id, status, page_index).await?;
    if page_index.is_some() {
        print_page(&view);
    }
    Ok(())
}

/// Loads the requested page first so the changed row shows up in it.
async fn change_status<S: PlaceStore>(
    view: &mut LeadsView<S>,
    id: &Id,
    status: PlaceStatus,
    page_index: Option<u64>,
) -> Result<()> {
    if let Some(page_index) = page_index {
        view.load(page_index).await?;
    }
    view.set_status(id, status).await
}

/// Fetches the lead, overwrites the given fields and saves it back.
pub async fn update(id: &Id, changes: Vec<(String, Value)>, conf: &Conf) -> Result<()> {
    let api = session_client(conf)?;
    let place = api.place(id).await?;
    let place = apply_changes(place, changes)?;
    api.update_place(&place).await?;
    info!(%id, "Place updated");
    Ok(())
}

pub async fn delete(id: &Id, conf: &Conf) -> Result<()> {
    session_client(conf)?.delete_place(id).await?;
    info!(%id, "Place deleted");
    Ok(())
}

fn print_page<S: PlaceStore>(view: &LeadsView<S>) {
    for line in page_lines(view) {
        println!("{line}");
    }
}

fn page_lines<S: PlaceStore>(view: &LeadsView<S>) -> Vec<String> {
    let mut lines: Vec<String> = view.page().data.iter().map(format_place).collect();
    lines.push(format!(
        "Page {} of {}, {} total",
        view.page_index() + 1,
        view.page().pagination.total_pages.max(1),
        view.page().pagination.total,
    ));
    lines
}

pub fn format_place(place: &PlaceRecord) -> String {
    let status = place
        .status
        .map(|it| it.to_string())
        .unwrap_or("-".into());
    let mut line = format!("#{} {} [{status}]", place.id, place.display_title());
    if let Some(category) = &place.category_name {
        line.push_str(&format!(" {category}"));
    }
    if let Some(city) = &place.city {
        line.push_str(&format!(", {city}"));
    }
    if let Some(phone) = &place.phone {
        line.push_str(&format!(" tel {phone}"));
    }
    if let Some(score) = place.total_score {
        line.push_str(&format!(" {score:.1}*"));
    }
    line
}

pub fn parse_status(raw: &str) -> std::result::Result<PlaceStatus, String> {
    PlaceStatus::from_str(raw.trim()).map_err(|_| {
        format!("unknown status {raw}, expected one of pending, client, visited, discarded")
    })
}

/// `field=value`, the value is parsed as JSON when it can be and kept as a
/// string otherwise.
pub fn parse_assignment(raw: &str) -> std::result::Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {raw}"))?;
    let field = field.trim();
    if field.is_empty() || field == "id" {
        Err(format!("can't update field {field:?}"))?
    }
    let value = serde_json::from_str(value).unwrap_or(Value::String(value.into()));
    Ok((field.into(), value))
}

fn apply_changes(place: PlaceRecord, changes: Vec<(String, Value)>) -> Result<PlaceRecord> {
    let mut json = serde_json::to_value(place)?;
    if let Value::Object(fields) = &mut json {
        for (field, value) in changes {
            fields.insert(field, value);
        }
    }
    Ok(serde_json::from_value(json)?)
}

#[cfg(test)]
mod test {
    use super::{
        apply_changes, change_status, format_place, page_lines, parse_assignment, parse_status,
    };
    use crate::{
        api::Id,
        place::{LeadsView, PlaceStatus},
        test::{mock_place, MockPlaceStore},
        Result,
    };
    use serde_json::json;
    use tokio::test;

    #[test]
    async fn place_line() {
        let mut place = mock_place(3);
        place.phone = Some("+57 601 555 0100".into());
        assert_eq!(
            "#3 Place 3 [pending] Restaurante, Bogotá tel +57 601 555 0100 4.5*",
            format_place(&place),
        );
    }

    #[test]
    async fn statuses() -> std::result::Result<(), String> {
        assert_eq!(PlaceStatus::Client, parse_status("client")?);
        assert_eq!(PlaceStatus::Pending, parse_status("por visita")?);
        assert!(parse_status("won").is_err());
        Ok(())
    }

    #[test]
    async fn assignments() -> std::result::Result<(), String> {
        assert_eq!(("phone".to_string(), json!("3001234567")), parse_assignment("phone=\"3001234567\"")?);
        assert_eq!(("reviews_count".to_string(), json!(12)), parse_assignment("reviews_count=12")?);
        assert_eq!(("city".to_string(), json!("Cali")), parse_assignment("city=Cali")?);
        assert!(parse_assignment("id=4").is_err());
        assert!(parse_assignment("city").is_err());
        Ok(())
    }

    #[test]
    async fn changes_keep_unknown_fields() -> Result<()> {
        let mut place = mock_place(8);
        place.extra.insert("notes".into(), json!("call back"));
        let place = apply_changes(
            place,
            vec![
                ("city".into(), json!("Cali")),
                ("status".into(), json!("visitado")),
                ("owner".into(), json!("ana")),
            ],
        )?;
        assert_eq!(Some("Cali".to_string()), place.city);
        assert_eq!(Some(PlaceStatus::Visited), place.status);
        assert_eq!(Some(&json!("call back")), place.extra.get("notes"));
        assert_eq!(Some(&json!("ana")), place.extra.get("owner"));
        Ok(())
    }

    #[test]
    async fn status_change_goes_through_view() -> Result<()> {
        let store = MockPlaceStore::with_places(vec![mock_place(1), mock_place(2)]);
        let mut view = LeadsView::new(store.clone(), 20);
        change_status(&mut view, &Id::Int(2), PlaceStatus::Discarded, Some(1)).await?;
        assert_eq!(vec![(1, 20)], store.fetches());
        assert_eq!(vec![(Id::Int(2), PlaceStatus::Discarded)], store.status_changes());
        let lines = page_lines(&view);
        assert!(lines[1].starts_with("#2 Place 2 [discarded]"), "{}", lines[1]);
        assert!(lines[2].starts_with("Page 2 of"), "{}", lines[2]);
        Ok(())
    }

    #[test]
    async fn status_change_without_page() -> Result<()> {
        let store = MockPlaceStore::with_places(vec![mock_place(1)]);
        let mut view = LeadsView::new(store.clone(), 20);
        change_status(&mut view, &Id::Int(1), PlaceStatus::Client, None).await?;
        assert!(store.fetches().is_empty());
        assert_eq!(vec![(Id::Int(1), PlaceStatus::Client)], store.status_changes());
        Ok(())
    }

    #[test]
    async fn rejected_status_change() -> Result<()> {
        let store = MockPlaceStore::with_places(vec![mock_place(1)]);
        let mut view = LeadsView::new(store.clone(), 20);
        view.load(0).await?;
        store.set_failing(true);
        assert!(change_status(&mut view, &Id::Int(1), PlaceStatus::Client, None)
            .await
            .is_err());
        assert_eq!(Some(PlaceStatus::Pending), view.page().data[0].status);
        Ok(())
    }
}
