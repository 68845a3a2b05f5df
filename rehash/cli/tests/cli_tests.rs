use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const FAST_CONFIG: &str = r#"
[pbkdf2]
iterations = 1000
length = 256

[bcrypt]
cost = 4

[scrypt]
work-factor = 16

[argon2]
memory = 256
iterations = 1
"#;

/// Helper to get the rh binary command with a low-cost config.
fn rh(dir: &TempDir) -> Command {
    let path = dir.path().join("rehash.toml");
    if !path.exists() {
        fs::write(&path, FAST_CONFIG).unwrap();
    }
    let mut cmd = Command::cargo_bin("rh").unwrap();
    cmd.arg("--config").arg(path);
    cmd
}

fn hash(dir: &TempDir, args: &[&str]) -> String {
    let output = rh(dir).arg("hash").args(args).output().expect("Failed to execute");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout).unwrap().trim_end().to_string()
}

mod hash_command {
    use super::*;

    #[test]
    fn defaults_to_argon2() {
        let dir = TempDir::new().unwrap();
        rh(&dir)
            .args(["hash", "secret"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("$argon2id$v=19$m=256,t=1,p=1$"));
    }

    #[test]
    fn every_family_can_be_selected() {
        let dir = TempDir::new().unwrap();
        for (family, prefix) in [
            ("pbkdf2", "$pbkdf2$SHA512$1000$256$"),
            ("compressed-pbkdf2", "$"),
            ("bcrypt", "$2b$04$"),
            ("scrypt", "$s0$40801$"),
            ("message-digest", "$md$SHA-512$"),
            ("argon2", "$argon2id$"),
        ] {
            let token = hash(&dir, &["--algorithm", family, "secret"]);
            assert!(token.starts_with(prefix), "{family}: {token}");
        }
    }

    #[test]
    fn explicit_salt_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let first = hash(&dir, &["-a", "pbkdf2", "--salt", "salt", "secret"]);
        let second = hash(&dir, &["-a", "pbkdf2", "--salt", "salt", "secret"]);
        assert_eq!(first, second);
        assert!(first.contains("$c2FsdA==$"));
    }

    #[test]
    fn reads_plaintext_from_stdin() {
        let dir = TempDir::new().unwrap();
        let from_arg = hash(&dir, &["-a", "message-digest", "secret"]);
        rh(&dir)
            .args(["hash", "-a", "message-digest", "-"])
            .write_stdin("secret\n")
            .assert()
            .success()
            .stdout(format!("{from_arg}\n").into_bytes());
    }

    #[test]
    fn bad_bcrypt_salt_is_an_error() {
        let dir = TempDir::new().unwrap();
        rh(&dir)
            .args(["hash", "-a", "bcrypt", "--salt", "short", "secret"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid parameters"));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn matching_plaintext_exits_zero() {
        let dir = TempDir::new().unwrap();
        let token = hash(&dir, &["-a", "bcrypt", "secret"]);
        rh(&dir)
            .args(["check", token.as_str(), "secret"])
            .assert()
            .success()
            .stdout("true\n");
    }

    #[test]
    fn wrong_plaintext_exits_one() {
        let dir = TempDir::new().unwrap();
        let token = hash(&dir, &["-a", "scrypt", "secret"]);
        rh(&dir)
            .args(["check", token.as_str(), "Secret"])
            .assert()
            .code(1)
            .stdout("false\n");
    }

    #[test]
    fn pepper_must_match() {
        let dir = TempDir::new().unwrap();
        let token = hash(&dir, &["-a", "pbkdf2", "--pepper", "pepper", "password"]);
        rh(&dir)
            .args(["check", token.as_str(), "password", "--pepper", "pepper"])
            .assert()
            .success();
        rh(&dir)
            .args(["check", token.as_str(), "password", "--pepper", "wrong"])
            .assert()
            .code(1);
    }

    #[test]
    fn malformed_token_exits_two() {
        let dir = TempDir::new().unwrap();
        rh(&dir)
            .args(["check", "$2b$10$tooshort", "secret"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("malformed bcrypt hash"));
        rh(&dir)
            .args(["check", "plain text", "secret"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported algorithm"));
    }
}

mod update_command {
    use super::*;

    #[test]
    fn verified_update_prints_new_token() {
        let dir = TempDir::new().unwrap();
        let old = hash(&dir, &["-a", "message-digest", "secret"]);
        let output = rh(&dir)
            .args(["update", old.as_str(), "secret", "--to", "bcrypt", "--new-pepper", "spice"])
            .output()
            .expect("Failed to execute");
        assert!(output.status.success());
        let new = String::from_utf8(output.stdout).unwrap().trim_end().to_string();
        assert!(new.starts_with("$2b$04$"), "{new}");

        rh(&dir)
            .args(["check", new.as_str(), "secret", "--pepper", "spice"])
            .assert()
            .success();
    }

    #[test]
    fn unverified_update_exits_one() {
        let dir = TempDir::new().unwrap();
        let old = hash(&dir, &["-a", "pbkdf2", "secret"]);
        rh(&dir)
            .args(["update", old.as_str(), "guess", "--to", "scrypt"])
            .assert()
            .code(1)
            .stdout("unverified\n");
    }
}

mod identify_command {
    use super::*;

    #[test]
    fn prints_family_name() {
        let dir = TempDir::new().unwrap();
        rh(&dir)
            .args(["identify", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"])
            .assert()
            .success()
            .stdout("bcrypt\n");
    }

    #[test]
    fn prints_parameters() {
        let dir = TempDir::new().unwrap();
        let token = hash(&dir, &["-a", "scrypt", "secret"]);
        rh(&dir)
            .args(["identify", "--params", token.as_str()])
            .assert()
            .success()
            .stdout("scrypt (N=16, r=8, p=1, 64 bytes)\n");
    }

    #[test]
    fn unknown_prefix_is_an_error() {
        let dir = TempDir::new().unwrap();
        rh(&dir).args(["identify", "$sha1$abc"]).assert().code(2);
    }
}

mod configuration {
    use super::*;

    #[test]
    fn configured_pepper_applies_to_hash_and_check() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("peppered.toml");
        fs::write(&path, format!("pepper = \"spice\"\n{FAST_CONFIG}")).unwrap();

        let output = Command::cargo_bin("rh")
            .unwrap()
            .arg("--config")
            .arg(&path)
            .args(["hash", "-a", "bcrypt", "secret"])
            .output()
            .expect("Failed to execute");
        let token = String::from_utf8(output.stdout).unwrap().trim_end().to_string();

        Command::cargo_bin("rh")
            .unwrap()
            .arg("--config")
            .arg(&path)
            .args(["check", token.as_str(), "secret"])
            .assert()
            .success();
        rh(&dir).args(["check", token.as_str(), "secret"]).assert().code(1);
        rh(&dir)
            .args(["check", token.as_str(), "secret", "--pepper", "spice"])
            .assert()
            .success();
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[bcrypt]\ncost = 99\n").unwrap();
        Command::cargo_bin("rh")
            .unwrap()
            .arg("--config")
            .arg(&path)
            .args(["hash", "secret"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid config"));
    }
}

mod completions {
    use super::*;

    #[test]
    fn bash_completions() {
        Command::cargo_bin("rh")
            .unwrap()
            .env("COMPLETE", "bash")
            .assert()
            .success()
            .stdout(predicate::str::contains("rh"));
    }
}
