use crate::domain::model::AllowedUpstream;
use crate::domain::ports::AccessControlList;
use crate::utils::error::Result;
use std::fmt;
use std::io::Write;

/// Instance targeted by an ACL command, optionally qualified by its service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub service: Option<String>,
    pub instance: String,
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.service.as_deref() {
            Some(service) if !service.is_empty() => write!(f, "{}/{}", service, self.instance),
            _ => f.write_str(&self.instance),
        }
    }
}

pub async fn add_acl(
    client: &dyn AccessControlList,
    target: &InstanceRef,
    host: &str,
    port: u16,
    out: &mut dyn Write,
) -> Result<()> {
    client.add(&target.instance, host, port).await?;
    writeln!(out, "Successfully added {}:{} to {} ACL.", host, port, target)?;
    Ok(())
}

pub async fn list_acl(
    client: &dyn AccessControlList,
    target: &InstanceRef,
    out: &mut dyn Write,
) -> Result<()> {
    let acls = client.list(&target.instance).await?;
    write!(out, "{}", render_acl_table(&acls))?;
    Ok(())
}

pub async fn remove_acl(
    client: &dyn AccessControlList,
    target: &InstanceRef,
    host: &str,
    port: u16,
    out: &mut dyn Write,
) -> Result<()> {
    client.remove(&target.instance, host, port).await?;
    writeln!(out, "Successfully removed {}:{} from {} ACL.", host, port, target)?;
    Ok(())
}

/// Renders `Host`/`Port` columns as a bordered table; empty input renders
/// nothing and an unset port renders as an empty cell.
pub fn render_acl_table(acls: &[AllowedUpstream]) -> String {
    if acls.is_empty() {
        return String::new();
    }

    let header = ["Host".to_string(), "Port".to_string()];
    let rows: Vec<[String; 2]> = acls
        .iter()
        .map(|acl| {
            let port = if acl.port > 0 {
                acl.port.to_string()
            } else {
                String::new()
            };
            [acl.host.clone(), port]
        })
        .collect();

    let mut widths = header.clone().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = format!(
        "+{}+\n",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: &[String; 2]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let fill = width - cell.chars().count();
                format!(" {}{} ", cell, " ".repeat(fill))
            })
            .collect();
        format!("|{}|\n", padded.join("|"))
    };

    let mut table = String::new();
    table.push_str(&border);
    table.push_str(&line(&header));
    table.push_str(&border);
    for row in &rows {
        table.push_str(&line(row));
    }
    table.push_str(&border);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAcl {
        calls: Mutex<Vec<String>>,
        entries: Vec<AllowedUpstream>,
    }

    #[async_trait]
    impl AccessControlList for RecordingAcl {
        async fn add(&self, instance: &str, host: &str, port: u16) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("add {instance} {host}:{port}"));
            Ok(())
        }

        async fn list(&self, instance: &str) -> Result<Vec<AllowedUpstream>> {
            self.calls.lock().unwrap().push(format!("list {instance}"));
            Ok(self.entries.clone())
        }

        async fn remove(&self, instance: &str, host: &str, port: u16) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remove {instance} {host}:{port}"));
            Ok(())
        }
    }

    fn target(service: Option<&str>) -> InstanceRef {
        InstanceRef {
            service: service.map(str::to_string),
            instance: "my-instance".to_string(),
        }
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(render_acl_table(&[]), "");
    }

    #[test]
    fn test_render_table() {
        let acls = vec![
            AllowedUpstream {
                host: "my-app.tsuru.example.com".to_string(),
                port: 443,
            },
            AllowedUpstream {
                host: "10.0.0.1".to_string(),
                port: 0,
            },
        ];

        let expected = "\
+--------------------------+------+
| Host                     | Port |
+--------------------------+------+
| my-app.tsuru.example.com | 443  |
| 10.0.0.1                 |      |
+--------------------------+------+
";
        assert_eq!(render_acl_table(&acls), expected);
    }

    #[tokio::test]
    async fn test_add_prints_qualified_instance() {
        let client = RecordingAcl::default();
        let mut out = Vec::new();

        add_acl(&client, &target(Some("rpaasv2")), "10.0.0.1", 80, &mut out)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Successfully added 10.0.0.1:80 to rpaasv2/my-instance ACL.\n"
        );
        assert_eq!(
            client.calls.lock().unwrap().as_slice(),
            ["add my-instance 10.0.0.1:80"]
        );
    }

    #[tokio::test]
    async fn test_remove_prints_instance() {
        let client = RecordingAcl::default();
        let mut out = Vec::new();

        remove_acl(&client, &target(None), "10.0.0.1", 80, &mut out)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Successfully removed 10.0.0.1:80 from my-instance ACL.\n"
        );
    }

    #[tokio::test]
    async fn test_list_renders_table() {
        let client = RecordingAcl {
            entries: vec![AllowedUpstream {
                host: "a".to_string(),
                port: 8080,
            }],
            ..Default::default()
        };
        let mut out = Vec::new();

        list_acl(&client, &target(None), &mut out).await.unwrap();

        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("| Host | Port |"));
        assert!(rendered.contains("| a    | 8080 |"));
    }
}
