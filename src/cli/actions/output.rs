use crate::{
    cli::globals::GlobalArgs,
    logistics::{packages::Package, reports::ShipmentReport, Ack},
    session::{Notice, NoticeKind, User},
};
use anyhow::Result;
use serde::Serialize;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints success and warning notices. Errors travel back as `Err` instead.
pub fn notice(notice: Option<&Notice>) {
    match notice {
        Some(Notice {
            kind: NoticeKind::Success,
            text,
        }) => println!("{text}"),
        Some(Notice {
            kind: NoticeKind::Warning,
            text,
        }) => eprintln!("warning: {text}"),
        _ => {}
    }
}

pub fn ack(ack: &Ack, fallback: &str) {
    println!("{}", ack.message.as_deref().unwrap_or(fallback));
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|value| !value.trim().is_empty()).unwrap_or("-")
}

pub fn package(package: &Package) {
    println!("Package      {}", package.id);
    println!("Tracking     {}", or_dash(package.tracking_code.as_deref()));
    println!("Status       {}", package.status);
    println!("Sender       {}", package.sender_name);
    println!("Recipient    {}", package.recipient_name);
    println!("Address      {}", package.delivery_address);
    println!("Phone        {}", or_dash(package.recipient_phone.as_deref()));
    match package.weight {
        Some(weight) => println!("Weight       {weight:.2} kg"),
        None => println!("Weight       -"),
    }
    println!("Messenger    {}", or_dash(package.messenger_name.as_deref()));
    println!("Client       {}", or_dash(package.client_name.as_deref()));
    println!("Updated      {}", or_dash(package.updated_at.as_deref().or(package.created_at.as_deref())));
}

pub fn packages(globals: &GlobalArgs, packages: &[&Package]) -> Result<()> {
    if globals.json {
        return json(packages);
    }
    if packages.is_empty() {
        println!("No packages.");
        return Ok(());
    }
    println!(
        "{:>6}  {:<14}  {:<16}  {:<20}  ADDRESS",
        "ID", "TRACKING", "STATUS", "RECIPIENT"
    );
    for package in packages {
        println!(
            "{:>6}  {:<14}  {:<16}  {:<20}  {}",
            package.id.to_string(),
            or_dash(package.tracking_code.as_deref()),
            package.status.label(),
            package.recipient_name,
            package.delivery_address
        );
    }
    Ok(())
}

pub fn users(globals: &GlobalArgs, users: &[User]) -> Result<()> {
    if globals.json {
        return json(users);
    }
    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }
    println!("{:>6}  {:<28}  {:<10}  EMAIL", "ID", "NAME", "ROLE");
    for user in users {
        let id = user.id.as_ref().map(ToString::to_string);
        println!(
            "{:>6}  {:<28}  {:<10}  {}",
            or_dash(id.as_deref()),
            user.display_name(),
            user.role.label(),
            or_dash(user.email.as_deref())
        );
    }
    Ok(())
}

pub fn report(globals: &GlobalArgs, report: &ShipmentReport) -> Result<()> {
    if globals.json {
        return json(report);
    }
    println!("Packages      {}", report.total);
    println!("Pending       {}", report.pending);
    println!("In progress   {}", report.in_progress);
    println!("Delivered     {}", report.delivered);
    println!("Delivery rate {:.1}%", report.delivery_rate());
    if !report.by_status.is_empty() {
        println!();
        println!("By status");
        for (status, count) in &report.by_status {
            println!("  {:<18} {count}", status.label());
        }
    }
    println!();
    println!("By messenger");
    for (messenger, count) in &report.by_messenger {
        println!("  {messenger:<18} {count}");
    }
    println!("  {:<18} {}", crate::logistics::reports::UNASSIGNED, report.unassigned);
    Ok(())
}
