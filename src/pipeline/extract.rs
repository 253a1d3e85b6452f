//! Unpack pipeline: image -> extraction tree
//!
//! Three fixed stages of packer invocations. Stage I splits the image
//! into a header and decrypted partition blobs and further decomposes
//! each partition; Stage II unpacks the filesystem blobs into
//! directory trees; Stage III unpacks the banner. Each stage commits
//! its rename/copy side effects before the next one starts.

use crate::config::{PARTITIONS, SessionConfig, path_arg};
use crate::exceptions::Result;
use crate::fsutil::remove_file_if_exists;
use crate::progress::StageSpinner;
use crate::runner::ToolRunner;
use log::info;
use std::fs;

/// Stage I: split the image into header + partitions, then decompose
/// each partition into its sub-blobs
pub(crate) fn stage1_commands(cfg: &SessionConfig) -> Vec<Vec<String>> {
    let mut commands = Vec::new();

    let mut split = vec![
        "-xtf".to_string(),
        "3ds".to_string(),
        path_arg(&cfg.rom),
        "--header".to_string(),
        cfg.blob("HeaderNCCH.bin"),
    ];
    for part in &PARTITIONS {
        split.push(format!("-{}", part.index));
        split.push(cfg.blob(&format!("DecryptedPartition{}.bin", part.index)));
    }
    commands.push(split);

    for part in &PARTITIONS {
        let partition_blob = cfg.blob(&format!("DecryptedPartition{}.bin", part.index));
        let header_blob = cfg.blob(&format!("HeaderNCCH{}.bin", part.index));

        let cmd = if part.is_primary() {
            vec![
                "-xtf".to_string(),
                "cxi".to_string(),
                partition_blob,
                "--header".to_string(),
                header_blob,
                "--exh".to_string(),
                cfg.blob("DecryptedExHeader.bin"),
                "--exefs".to_string(),
                cfg.blob("DecryptedExeFS.bin"),
                "--romfs".to_string(),
                cfg.blob("DecryptedRomFS.bin"),
                "--logo".to_string(),
                cfg.blob("LogoLZ.bin"),
                "--plain".to_string(),
                cfg.blob("PlainRGN.bin"),
            ]
        } else {
            vec![
                "-xtf".to_string(),
                "cfa".to_string(),
                partition_blob,
                "--header".to_string(),
                header_blob,
                "--romfs".to_string(),
                cfg.blob(&format!("Decrypted{}.bin", part.name)),
            ]
        };
        commands.push(cmd);
    }

    commands
}

/// Stage II: unpack every filesystem blob into a directory tree
pub(crate) fn stage2_commands(cfg: &SessionConfig) -> Vec<Vec<String>> {
    let mut commands = vec![vec![
        "-xtf".to_string(),
        "romfs".to_string(),
        cfg.blob("DecryptedRomFS.bin"),
        "--romfs-dir".to_string(),
        cfg.blob("ExtractedRomFS"),
    ]];

    for part in PARTITIONS.iter().filter(|p| !p.is_primary()) {
        commands.push(vec![
            "-xtf".to_string(),
            "romfs".to_string(),
            cfg.blob(&format!("Decrypted{}.bin", part.name)),
            "--romfs-dir".to_string(),
            cfg.blob(&format!("Extracted{}", part.name)),
        ]);
    }

    commands.push(vec![
        "-xtf".to_string(),
        "exefs".to_string(),
        cfg.blob("DecryptedExeFS.bin"),
        "--exefs-dir".to_string(),
        cfg.blob("ExtractedExeFS"),
        "--header".to_string(),
        cfg.blob("HeaderExeFS.bin"),
    ]);

    commands
}

/// Stage III: unpack the banner blob
pub(crate) fn stage3_commands(cfg: &SessionConfig) -> Vec<Vec<String>> {
    vec![vec![
        "-x".to_string(),
        "-t".to_string(),
        "banner".to_string(),
        "-f".to_string(),
        cfg.blob("banner.bin"),
        "--banner-dir".to_string(),
        cfg.blob("ExtractedBanner"),
    ]]
}

/// Run the full unpack pipeline into a fresh extraction tree
pub fn run(cfg: &SessionConfig, runner: &ToolRunner) -> Result<()> {
    info!("Beginning extraction...");
    fs::create_dir_all(&cfg.extract_dir)?;

    {
        let _spinner = StageSpinner::start("Executing stage I extraction commands...");
        runner.run_all(&stage1_commands(cfg))?;
    }
    // Per-partition blobs are no longer needed once decomposed; drop
    // them early to bound disk usage. Absent blobs are tolerated.
    for part in &PARTITIONS {
        remove_file_if_exists(
            &cfg.extract_dir
                .join(format!("DecryptedPartition{}.bin", part.index)),
        )?;
    }
    info!("Stage I is complete.");

    {
        let _spinner = StageSpinner::start("Executing stage II extraction commands...");
        runner.run_all(&stage2_commands(cfg))?;
    }
    let exefs = cfg.extract_dir.join("ExtractedExeFS");
    fs::rename(exefs.join("banner.bnr"), exefs.join("banner.bin"))?;
    fs::rename(exefs.join("icon.icn"), exefs.join("icon.bin"))?;
    fs::copy(exefs.join("banner.bin"), cfg.extract_dir.join("banner.bin"))?;
    info!("Stage II is complete.");

    {
        let _spinner = StageSpinner::start("Executing stage III extraction commands...");
        runner.run_all(&stage3_commands(cfg))?;
    }
    fs::remove_file(cfg.extract_dir.join("banner.bin"))?;
    let banner = cfg.extract_dir.join("ExtractedBanner");
    fs::rename(banner.join("banner0.bcmdl"), banner.join("banner.cgfx"))?;
    info!("Stage III is complete.");

    info!("Extraction has completed successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SessionConfig {
        SessionConfig::new("game.3ds")
    }

    #[test]
    fn stage1_split_lists_partitions_in_map_order() {
        let commands = stage1_commands(&cfg());
        let split = &commands[0];

        assert_eq!(&split[..2], &["-xtf".to_string(), "3ds".to_string()]);
        assert_eq!(split[2], "game.3ds");

        let flags: Vec<String> = split
            .iter()
            .filter(|a| a.len() == 2 && a.starts_with('-'))
            .cloned()
            .collect();
        assert_eq!(flags, vec!["-0", "-1", "-2", "-6", "-7"]);
    }

    #[test]
    fn stage1_decomposes_every_partition() {
        let commands = stage1_commands(&cfg());
        // one split command + one per partition
        assert_eq!(commands.len(), 1 + PARTITIONS.len());

        assert_eq!(commands[1][1], "cxi");
        assert!(commands[1].contains(&"original/DecryptedRomFS.bin".to_string()));
        assert!(commands[1].contains(&"original/LogoLZ.bin".to_string()));

        for (cmd, part) in commands[2..].iter().zip(&PARTITIONS[1..]) {
            assert_eq!(cmd[1], "cfa");
            assert!(cmd.contains(&format!("original/Decrypted{}.bin", part.name)));
        }
    }

    #[test]
    fn stage2_unpacks_each_filesystem() {
        let commands = stage2_commands(&cfg());
        assert_eq!(commands.len(), 6);

        assert!(commands[0].contains(&"original/ExtractedRomFS".to_string()));
        assert!(commands[1].contains(&"original/ExtractedManual".to_string()));
        assert!(commands[4].contains(&"original/ExtractedO3DSUpdate".to_string()));

        let exefs = commands.last().unwrap();
        assert_eq!(exefs[1], "exefs");
        assert!(exefs.contains(&"original/HeaderExeFS.bin".to_string()));
    }

    #[test]
    fn stage3_targets_the_banner_blob() {
        let commands = stage3_commands(&cfg());
        assert_eq!(commands.len(), 1);
        assert!(commands[0].contains(&"original/banner.bin".to_string()));
        assert!(commands[0].contains(&"original/ExtractedBanner".to_string()));
    }
}
