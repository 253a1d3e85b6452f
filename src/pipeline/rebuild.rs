//! Repack pipeline: reconciled trees -> output image
//!
//! Inverse of the unpack pipeline. The RomFS is packed from the
//! working tree (the one editable subtree); every other input comes
//! from the extraction tree, which reconciliation has already made
//! authoritative. Generated partition blobs at or below the prune
//! threshold are placeholder partitions and get deleted before final
//! assembly.

use crate::config::{PARTITIONS, PRUNE_THRESHOLD, SessionConfig, path_arg};
use crate::exceptions::Result;
use crate::fsutil::remove_file_if_exists;
use crate::progress::StageSpinner;
use crate::runner::ToolRunner;
use log::{debug, info};
use std::fs;

/// Stage I: pack the RomFS from the working tree
pub(crate) fn romfs_command(cfg: &SessionConfig) -> Vec<String> {
    vec![
        "-ctf".to_string(),
        "romfs".to_string(),
        cfg.blob("CustomRomFS.bin"),
        "--romfs-dir".to_string(),
        cfg.working("ExtractedRomFS"),
    ]
}

/// Stage I: pack the executable filesystem
pub(crate) fn exefs_command(cfg: &SessionConfig) -> Vec<String> {
    vec![
        "-ctf".to_string(),
        "exefs".to_string(),
        cfg.blob("CustomExeFS.bin"),
        "--exefs-dir".to_string(),
        cfg.blob("ExtractedExeFS"),
        "--header".to_string(),
        cfg.blob("HeaderExeFS.bin"),
    ]
}

/// Stage II: pack secondary resource trees, then assemble every
/// partition from its sub-blobs
pub(crate) fn stage2_commands(cfg: &SessionConfig) -> Vec<Vec<String>> {
    let mut commands = Vec::new();

    for part in PARTITIONS.iter().filter(|p| !p.is_primary()) {
        commands.push(vec![
            "-ctf".to_string(),
            "romfs".to_string(),
            cfg.blob(&format!("Custom{}.bin", part.name)),
            "--romfs-dir".to_string(),
            cfg.blob(&format!("Extracted{}", part.name)),
        ]);
    }

    for part in &PARTITIONS {
        let partition_blob = cfg.blob(&format!("CustomPartition{}.bin", part.index));
        let header_blob = cfg.blob(&format!("HeaderNCCH{}.bin", part.index));

        let cmd = if part.is_primary() {
            vec![
                "-ctf".to_string(),
                "cxi".to_string(),
                partition_blob,
                "--header".to_string(),
                header_blob,
                "--exh".to_string(),
                cfg.blob("DecryptedExHeader.bin"),
                "--exefs".to_string(),
                cfg.blob("CustomExeFS.bin"),
                "--romfs".to_string(),
                cfg.blob("CustomRomFS.bin"),
                "--logo".to_string(),
                cfg.blob("LogoLZ.bin"),
                "--plain".to_string(),
                cfg.blob("PlainRGN.bin"),
            ]
        } else {
            vec![
                "-ctf".to_string(),
                "cfa".to_string(),
                partition_blob,
                "--header".to_string(),
                header_blob,
                "--romfs".to_string(),
                cfg.blob(&format!("Custom{}.bin", part.name)),
            ]
        };
        commands.push(cmd);
    }

    commands
}

/// Stage III: assemble the final output image in partition-map order
pub(crate) fn assemble_command(cfg: &SessionConfig) -> Vec<String> {
    let mut cmd = vec![
        "-ctf".to_string(),
        "3ds".to_string(),
        path_arg(&cfg.output),
        "--header".to_string(),
        cfg.blob("HeaderNCCH.bin"),
    ];
    for part in &PARTITIONS {
        cmd.push(format!("-{}", part.index));
        cmd.push(cfg.blob(&format!("CustomPartition{}.bin", part.index)));
    }
    cmd
}

/// Delete generated `Custom*.bin` blobs at or below the prune
/// threshold (empty/placeholder partitions)
pub(crate) fn prune_placeholder_blobs(cfg: &SessionConfig) -> Result<()> {
    for entry in fs::read_dir(&cfg.extract_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("Custom") && name.ends_with(".bin") {
            let size = entry.metadata()?.len();
            if size <= PRUNE_THRESHOLD {
                debug!("Pruning placeholder blob {name} ({size} bytes)");
                fs::remove_file(entry.path())?;
            }
        }
    }
    Ok(())
}

/// Drop the intermediate `Custom*.bin` blobs after assembly so the
/// extraction tree returns to its post-unpack state and stays valid
/// as a cache
fn remove_custom_blobs(cfg: &SessionConfig) -> Result<()> {
    for entry in fs::read_dir(&cfg.extract_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("Custom") && name.ends_with(".bin") {
            remove_file_if_exists(&entry.path())?;
        }
    }
    Ok(())
}

/// Run the full repack pipeline, producing the output image
pub fn run(cfg: &SessionConfig, runner: &ToolRunner) -> Result<()> {
    info!("Beginning reconstruction process.");
    let exefs = cfg.extract_dir.join("ExtractedExeFS");

    {
        let _spinner = StageSpinner::start("Executing stage I reconstruction commands...");
        runner.run(&romfs_command(cfg))?;

        // The packer expects the original extensions; swap them in for
        // the pack and back out afterwards
        fs::rename(exefs.join("banner.bin"), exefs.join("banner.bnr"))?;
        fs::rename(exefs.join("icon.bin"), exefs.join("icon.icn"))?;

        let packed = runner.run(&exefs_command(cfg));

        fs::rename(exefs.join("banner.bnr"), exefs.join("banner.bin"))?;
        fs::rename(exefs.join("icon.icn"), exefs.join("icon.bin"))?;
        packed?;
    }
    info!("Stage I is complete.");

    {
        let _spinner = StageSpinner::start("Executing stage II reconstruction commands...");
        runner.run_all(&stage2_commands(cfg))?;
    }
    prune_placeholder_blobs(cfg)?;
    info!("Stage II is complete.");

    {
        let _spinner = StageSpinner::start(
            "Executing stage III reconstruction commands, and building final ROM...",
        );
        runner.run(&assemble_command(cfg))?;
    }
    remove_custom_blobs(cfg)?;
    info!("Stage III is complete. Final ROM has been built.");

    info!("Reconstruction process has completed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cfg() -> SessionConfig {
        SessionConfig::new("game.3ds")
    }

    #[test]
    fn romfs_is_packed_from_the_working_tree() {
        let cmd = romfs_command(&cfg());
        assert!(cmd.contains(&"modded/ExtractedRomFS".to_string()));
        assert!(cmd.contains(&"original/CustomRomFS.bin".to_string()));
    }

    #[test]
    fn stage2_packs_secondaries_before_assembling_partitions() {
        let commands = stage2_commands(&cfg());
        // four secondary romfs packs + five partition assemblies
        assert_eq!(commands.len(), 4 + PARTITIONS.len());

        assert!(commands[0].contains(&"original/CustomManual.bin".to_string()));
        assert_eq!(commands[4][1], "cxi");
        assert!(commands[4].contains(&"original/CustomExeFS.bin".to_string()));
        assert_eq!(commands[5][1], "cfa");
    }

    #[test]
    fn final_assembly_lists_partitions_in_map_order() {
        let cmd = assemble_command(&cfg());
        assert_eq!(cmd[2], "game_modded.3ds");

        let flags: Vec<String> = cmd
            .iter()
            .filter(|a| a.len() == 2 && a.starts_with('-'))
            .cloned()
            .collect();
        assert_eq!(flags, vec!["-0", "-1", "-2", "-6", "-7"]);
    }

    #[test]
    fn pruning_respects_the_threshold() {
        let dir = TempDir::new().unwrap();
        let mut cfg = cfg();
        cfg.extract_dir = dir.path().to_path_buf();

        let small = dir.path().join("CustomManual.bin");
        let exact = dir.path().join("CustomDownloadPlay.bin");
        let large = dir.path().join("CustomRomFS.bin");
        let unrelated = dir.path().join("DecryptedRomFS.bin");

        std::fs::write(&small, vec![0u8; 16]).unwrap();
        std::fs::write(&exact, vec![0u8; PRUNE_THRESHOLD as usize]).unwrap();
        std::fs::write(&large, vec![0u8; PRUNE_THRESHOLD as usize + 1]).unwrap();
        std::fs::write(&unrelated, vec![0u8; 8]).unwrap();

        prune_placeholder_blobs(&cfg).unwrap();

        assert!(!small.exists());
        assert!(!exact.exists(), "threshold is inclusive");
        assert!(large.exists());
        assert!(unrelated.exists(), "only Custom*.bin blobs are pruned");
    }
}
