use anyhow::Result;

fn main() -> Result<()> {
    let json = windsayl::api::openapi().to_pretty_json()?;
    println!("{json}");
    Ok(())
}
