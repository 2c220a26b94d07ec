use threadview_core::error::Result;
use threadview_core::flatten::PageView;

/// Print the page view as pretty JSON
pub fn print(view: &PageView) -> Result<()> {
    let loaders: Vec<&str> = view.loaders().iter().map(|l| l.key.id()).collect();
    let mut output = serde_json::to_value(view)?;
    if let Some(obj) = output.as_object_mut() {
        obj.insert("pending_loaders".to_string(), serde_json::json!(loaders));
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
