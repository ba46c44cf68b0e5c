use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CalibError, Result};

/// Run description handed to a driver: its inputs, the files it may read and
/// where its outputs go.
pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: Option<I>,
    pub seed: u64,
    pub replicate: u64,
    pub files: HashMap<String, PathBuf>,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = data
            .get("input")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let seed = input_json
            .remove("seed")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let replicate = input_json
            .remove("replicate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let files = data
            .get("model")
            .and_then(|m| m.get("files"))
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), PathBuf::from(s))))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            input_json,
            input: None,
            seed,
            replicate,
            files,
            output: data.get("output").cloned().unwrap_or(Value::Null),
        }
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Err(CalibError::InvalidInput("no run description given".to_string()));
        }
        Ok(Self::from_json(serde_json::from_str(&raw)?))
    }

    pub fn from_stdin() -> Result<Self> {
        Self::from_reader(io::stdin().lock())
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>> {
        let input = serde_json::from_value(Value::Object(self.input_json.clone()))?;
        Ok(Environment {
            input_json: self.input_json,
            input: Some(input),
            seed: self.seed,
            replicate: self.replicate,
            files: self.files,
            output: self.output,
        })
    }
}

impl<I: DeserializeOwned> Environment<I> {
    pub fn load() -> Result<Self> {
        Environment::from_stdin()?.with_input_type::<I>()
    }
}

impl<I> Environment<I> {
    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    pub fn file(&self, key: &str) -> Result<&Path> {
        self.files
            .get(key)
            .map(PathBuf::as_path)
            .ok_or_else(|| CalibError::MissingFile(key.to_string()))
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        if output.get("spec").and_then(Value::as_str) == Some("filesystem") {
            return output.get("dir").and_then(Value::as_str).map(PathBuf::from);
        }

        // Profiled output: the "default" profile, else the first one listed.
        let profile = output
            .get("profile")
            .and_then(Value::as_object)
            .and_then(|profiles| profiles.get("default").or_else(|| profiles.values().next()))?;
        if profile.get("spec").and_then(Value::as_str) == Some("filesystem") {
            return profile.get("dir").and_then(Value::as_str).map(PathBuf::from);
        }
        None
    }

    fn sink(&self, filename: &str) -> Result<Box<dyn Write>> {
        match self.output_dir() {
            Some(dir) => {
                fs::create_dir_all(&dir)?;
                let path = dir.join(filename);
                log::info!("writing {}", path.display());
                Ok(Box::new(fs::File::create(path)?))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }

    pub fn write(&self, filename: &str, data: &[u8]) -> Result<()> {
        let mut sink = self.sink(filename)?;
        sink.write_all(data)?;
        sink.flush()?;
        Ok(())
    }

    pub fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<()> {
        let mut data = serde_json::to_vec_pretty(value)?;
        data.push(b'\n');
        self.write(filename, &data)
    }

    pub fn write_csv(&self, filename: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(self.sink(filename)?);
        wtr.write_record(headers)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
