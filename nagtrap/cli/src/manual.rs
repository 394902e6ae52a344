pub const MANUAL: &str = r#"NAME
    nagtrap - send Nagios service events to a Network Node Manager as SNMP traps

SYNOPSIS
    nagtrap -s <state> -S <service> -o <output> [-d <destination>] [-H <hostname>]
            [-c <config-dir>] [-m|--man] [-V|--version] [-h|--help]

DESCRIPTION
    nagtrap is meant to be called by a Nagios notification or event handler command.
    It sends one NAGIOS-NOTIFY-MIB nSvcEvent trap (1.3.6.1.4.1.20006.1.7) describing the
    service state change to the NNM and exits.

    The trap is sent with the first available transport, in this order:
      1. the SNMP v2c client compiled into nagtrap, when enabled in the configuration;
      2. the NNM vendor binary, /opt/OV/bin/snmpnotify by default;
      3. the net-snmp snmptrap binary, searched in /opt/nagtrap/bin, then in the
         well-known location of the OS, then in /usr/bin, /usr/local/bin, /bin,
         /usr/sbin and /opt/bin.
    If the selected transport fails, no other transport is tried.

OPTIONS
    -s, --state <state>
        The service state: ok, warning, critical or unknown (case insensitive).

    -S, --service <service>
        The service description.

    -o, --output <output>
        The plugin output. Everything after the first '|' is performance data and is dropped.

    -d, --destination <destination>
        The NNM receiving the trap.

    -H, --hostname <hostname>
        The host reported in the trap. Defaults to the fully qualified name of the local host.

    -c, --config-dir <config-dir>
        The folder holding nagtrap.toml. Defaults to /etc/nagtrap.

    -m, --man
        Prints this manual.

    -V, --version
        Prints the version, the environment overrides and the detected transports.

    -h, --help
        Prints the usage.

DESTINATION
    The first of: the --destination option, the NAGTRAP_NNMS environment variable,
    the first "NNMS <host>" line of the NNM config file (/etc/nagtrap/nnm.conf by default).

HOSTNAME
    The first of: the --hostname option, the NAGTRAP_HOSTNAME environment variable,
    the fully qualified domain name of the local host.

CONFIGURATION
    <config-dir>/nagtrap.toml is optional. Example:

        [logger]
        level = "warn"
        stderr_output = true
        file_output_path = "/var/log/nagtrap/nagtrap.log"

        [sender]
        nnm_config_path = "/etc/nagtrap/nnm.conf"
        community = "public"
        trap_port = 162
        timeout_secs = 10
        native_snmp = true

        [sender.transport_paths]
        vendor_binary = "/opt/OV/bin/snmpnotify"
        custom_snmptrap = "/opt/nagtrap/bin/snmptrap"
        fallback_dirs = ["/usr/bin", "/usr/local/bin", "/bin", "/usr/sbin", "/opt/bin"]

EXIT STATUS
    0   the trap was sent
    1   configuration, hostname resolution, validation or transport error
    2   usage error

EXAMPLE
    nagtrap -s critical -S "Generic Service" -o "Something bad happened" -d 192.0.2.5
"#;
