use std::fmt;

use super::{ClusteringOrder, DataType, Identifier, buildable_via_display, qualified};

/// Keyspace replication settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replication {
    Simple { replication_factor: u32 },
    NetworkTopology { datacenters: Vec<(String, u32)> },
}

impl fmt::Display for Replication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replication::Simple { replication_factor } => write!(
                f,
                "{{'class':'SimpleStrategy','replication_factor':{replication_factor}}}"
            ),
            Replication::NetworkTopology { datacenters } => {
                f.write_str("{'class':'NetworkTopologyStrategy'")?;
                for (datacenter, factor) in datacenters {
                    write!(f, ",'{}':{factor}", datacenter.replace('\'', "''"))?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_keyspace_options(
    f: &mut fmt::Formatter<'_>,
    replication: Option<&Replication>,
    durable_writes: Option<bool>,
) -> fmt::Result {
    let mut separator = " WITH ";
    if let Some(replication) = replication {
        write!(f, "{separator}replication={replication}")?;
        separator = " AND ";
    }
    if let Some(durable) = durable_writes {
        write!(f, "{separator}durable_writes={durable}")?;
    }
    Ok(())
}

/// `CREATE KEYSPACE`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateKeyspace {
    keyspace: Identifier,
    if_not_exists: bool,
    replication: Option<Replication>,
    durable_writes: Option<bool>,
}

impl CreateKeyspace {
    pub fn new(keyspace: Identifier) -> Self {
        Self {
            keyspace,
            if_not_exists: false,
            replication: None,
            durable_writes: None,
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn with_simple_strategy(mut self, replication_factor: u32) -> Self {
        self.replication = Some(Replication::Simple { replication_factor });
        self
    }

    pub fn with_network_topology_strategy<S: Into<String>>(
        mut self,
        datacenters: impl IntoIterator<Item = (S, u32)>,
    ) -> Self {
        self.replication = Some(Replication::NetworkTopology {
            datacenters: datacenters
                .into_iter()
                .map(|(dc, factor)| (dc.into(), factor))
                .collect(),
        });
        self
    }

    pub fn with_durable_writes(mut self, durable_writes: bool) -> Self {
        self.durable_writes = Some(durable_writes);
        self
    }

    pub fn keyspace(&self) -> &Identifier {
        &self.keyspace
    }
}

impl fmt::Display for CreateKeyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE KEYSPACE ")?;
        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }
        f.write_str(&self.keyspace.as_cql())?;
        write_keyspace_options(f, self.replication.as_ref(), self.durable_writes)
    }
}

/// `ALTER KEYSPACE`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterKeyspace {
    keyspace: Identifier,
    replication: Option<Replication>,
    durable_writes: Option<bool>,
}

impl AlterKeyspace {
    pub fn new(keyspace: Identifier) -> Self {
        Self {
            keyspace,
            replication: None,
            durable_writes: None,
        }
    }

    pub fn with_simple_strategy(mut self, replication_factor: u32) -> Self {
        self.replication = Some(Replication::Simple { replication_factor });
        self
    }

    pub fn with_network_topology_strategy<S: Into<String>>(
        mut self,
        datacenters: impl IntoIterator<Item = (S, u32)>,
    ) -> Self {
        self.replication = Some(Replication::NetworkTopology {
            datacenters: datacenters
                .into_iter()
                .map(|(dc, factor)| (dc.into(), factor))
                .collect(),
        });
        self
    }

    pub fn with_durable_writes(mut self, durable_writes: bool) -> Self {
        self.durable_writes = Some(durable_writes);
        self
    }
}

impl fmt::Display for AlterKeyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER KEYSPACE {}", self.keyspace.as_cql())?;
        write_keyspace_options(f, self.replication.as_ref(), self.durable_writes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum DropTarget {
    Keyspace(Identifier),
    Table(Identifier, Identifier),
}

/// `DROP KEYSPACE` / `DROP TABLE`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropSchema {
    target: DropTarget,
    if_exists: bool,
}

impl DropSchema {
    pub fn keyspace(keyspace: Identifier) -> Self {
        Self {
            target: DropTarget::Keyspace(keyspace),
            if_exists: false,
        }
    }

    pub fn table(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            target: DropTarget::Table(keyspace, table),
            if_exists: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

impl fmt::Display for DropSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, name) = match &self.target {
            DropTarget::Keyspace(keyspace) => ("KEYSPACE", keyspace.as_cql()),
            DropTarget::Table(keyspace, table) => ("TABLE", qualified(keyspace, table)),
        };
        write!(f, "DROP {kind} ")?;
        if self.if_exists {
            f.write_str("IF EXISTS ")?;
        }
        f.write_str(&name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ColumnDefinition {
    name: Identifier,
    data_type: DataType,
    is_static: bool,
}

fn write_table_options(
    f: &mut fmt::Formatter<'_>,
    clustering_order: &[(Identifier, ClusteringOrder)],
    default_ttl: Option<u32>,
    comment: Option<&str>,
) -> fmt::Result {
    let mut separator = " WITH ";
    if !clustering_order.is_empty() {
        f.write_str(separator)?;
        f.write_str("CLUSTERING ORDER BY (")?;
        for (i, (column, order)) in clustering_order.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{column} {order}")?;
        }
        f.write_str(")")?;
        separator = " AND ";
    }
    if let Some(ttl) = default_ttl {
        write!(f, "{separator}default_time_to_live={ttl}")?;
        separator = " AND ";
    }
    if let Some(comment) = comment {
        write!(f, "{separator}comment='{}'", comment.replace('\'', "''"))?;
    }
    Ok(())
}

/// `CREATE TABLE`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTable {
    keyspace: Identifier,
    table: Identifier,
    if_not_exists: bool,
    partition_keys: Vec<ColumnDefinition>,
    clustering_columns: Vec<ColumnDefinition>,
    columns: Vec<ColumnDefinition>,
    clustering_order: Vec<(Identifier, ClusteringOrder)>,
    default_ttl: Option<u32>,
    comment: Option<String>,
}

impl CreateTable {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            keyspace,
            table,
            if_not_exists: false,
            partition_keys: Vec::new(),
            clustering_columns: Vec::new(),
            columns: Vec::new(),
            clustering_order: Vec::new(),
            default_ttl: None,
            comment: None,
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn with_partition_key(mut self, name: impl Into<Identifier>, data_type: DataType) -> Self {
        self.partition_keys.push(ColumnDefinition {
            name: name.into(),
            data_type,
            is_static: false,
        });
        self
    }

    pub fn with_clustering_column(
        mut self,
        name: impl Into<Identifier>,
        data_type: DataType,
    ) -> Self {
        self.clustering_columns.push(ColumnDefinition {
            name: name.into(),
            data_type,
            is_static: false,
        });
        self
    }

    pub fn with_column(mut self, name: impl Into<Identifier>, data_type: DataType) -> Self {
        self.columns.push(ColumnDefinition {
            name: name.into(),
            data_type,
            is_static: false,
        });
        self
    }

    pub fn with_static_column(mut self, name: impl Into<Identifier>, data_type: DataType) -> Self {
        self.columns.push(ColumnDefinition {
            name: name.into(),
            data_type,
            is_static: true,
        });
        self
    }

    pub fn with_clustering_order(
        mut self,
        name: impl Into<Identifier>,
        order: ClusteringOrder,
    ) -> Self {
        self.clustering_order.push((name.into(), order));
        self
    }

    /// Default TTL in seconds for rows written to the table
    pub fn with_default_ttl(mut self, seconds: u32) -> Self {
        self.default_ttl = Some(seconds);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn write_primary_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partition: Vec<String> = self.partition_keys.iter().map(|c| c.name.as_cql()).collect();
        f.write_str(",PRIMARY KEY(")?;
        if partition.len() == 1 {
            f.write_str(&partition[0])?;
        } else {
            write!(f, "({})", partition.join(","))?;
        }
        for column in &self.clustering_columns {
            write!(f, ",{}", column.name)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE TABLE ")?;
        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }
        write!(f, "{} (", qualified(&self.keyspace, &self.table))?;

        let inline_key = self.partition_keys.len() == 1 && self.clustering_columns.is_empty();
        let definitions = self
            .partition_keys
            .iter()
            .chain(&self.clustering_columns)
            .chain(&self.columns);
        for (i, column) in definitions.enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{} {}", column.name, column.data_type)?;
            if column.is_static {
                f.write_str(" STATIC")?;
            }
            if inline_key && i == 0 {
                f.write_str(" PRIMARY KEY")?;
            }
        }
        if !inline_key && !self.partition_keys.is_empty() {
            self.write_primary_key(f)?;
        }
        f.write_str(")")?;

        write_table_options(
            f,
            &self.clustering_order,
            self.default_ttl,
            self.comment.as_deref(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AlterTableInstruction {
    Add(Vec<(Identifier, DataType)>),
    Drop(Vec<Identifier>),
    Rename(Vec<(Identifier, Identifier)>),
    Options {
        default_ttl: Option<u32>,
        comment: Option<String>,
    },
}

/// `ALTER TABLE`
///
/// CQL allows a single kind of change per statement; switching kinds discards the
/// changes collected so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterTable {
    keyspace: Identifier,
    table: Identifier,
    instruction: Option<AlterTableInstruction>,
}

impl AlterTable {
    pub fn new(keyspace: Identifier, table: Identifier) -> Self {
        Self {
            keyspace,
            table,
            instruction: None,
        }
    }

    pub fn add_column(mut self, name: impl Into<Identifier>, data_type: DataType) -> Self {
        let column = (name.into(), data_type);
        match &mut self.instruction {
            Some(AlterTableInstruction::Add(columns)) => columns.push(column),
            _ => self.instruction = Some(AlterTableInstruction::Add(vec![column])),
        }
        self
    }

    pub fn drop_column(mut self, name: impl Into<Identifier>) -> Self {
        let column = name.into();
        match &mut self.instruction {
            Some(AlterTableInstruction::Drop(columns)) => columns.push(column),
            _ => self.instruction = Some(AlterTableInstruction::Drop(vec![column])),
        }
        self
    }

    pub fn rename_column(mut self, from: impl Into<Identifier>, to: impl Into<Identifier>) -> Self {
        let rename = (from.into(), to.into());
        match &mut self.instruction {
            Some(AlterTableInstruction::Rename(renames)) => renames.push(rename),
            _ => self.instruction = Some(AlterTableInstruction::Rename(vec![rename])),
        }
        self
    }

    pub fn with_default_ttl(mut self, seconds: u32) -> Self {
        match &mut self.instruction {
            Some(AlterTableInstruction::Options { default_ttl, .. }) => *default_ttl = Some(seconds),
            _ => {
                self.instruction = Some(AlterTableInstruction::Options {
                    default_ttl: Some(seconds),
                    comment: None,
                })
            }
        }
        self
    }

    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match &mut self.instruction {
            Some(AlterTableInstruction::Options { comment, .. }) => *comment = Some(text),
            _ => {
                self.instruction = Some(AlterTableInstruction::Options {
                    default_ttl: None,
                    comment: Some(text),
                })
            }
        }
        self
    }
}

impl fmt::Display for AlterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {}", qualified(&self.keyspace, &self.table))?;
        match &self.instruction {
            None => Ok(()),
            Some(AlterTableInstruction::Add(columns)) => {
                f.write_str(" ADD (")?;
                for (i, (name, data_type)) in columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name} {data_type}")?;
                }
                f.write_str(")")
            }
            Some(AlterTableInstruction::Drop(columns)) => {
                let names: Vec<String> = columns.iter().map(Identifier::as_cql).collect();
                write!(f, " DROP ({})", names.join(","))
            }
            Some(AlterTableInstruction::Rename(renames)) => {
                f.write_str(" RENAME ")?;
                for (i, (from, to)) in renames.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{from} TO {to}")?;
                }
                Ok(())
            }
            Some(AlterTableInstruction::Options {
                default_ttl,
                comment,
            }) => write_table_options(f, &[], *default_ttl, comment.as_deref()),
        }
    }
}

buildable_via_display!(CreateKeyspace, AlterKeyspace, DropSchema, CreateTable, AlterTable);
